// ============================================================================
// Society Core - Property Aggregate
// File: crates/society-core/src/domain/property.rs
// Description: Managed residential complex with its structure and invites
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::account::Role;

/// Housing type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HousingType {
    Villa,
    Flat,
}

impl HousingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            HousingType::Villa => "villa",
            HousingType::Flat => "flat",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "villa" => Some(HousingType::Villa),
            "flat" => Some(HousingType::Flat),
            _ => None,
        }
    }
}

impl Default for HousingType {
    fn default() -> Self {
        HousingType::Villa
    }
}

/// One structural grouping of units.
///
/// A wing is a row of single-floor villas numbered `{prefix}{NN}`; a block is a
/// multi-floor building numbered `{prefix}{FF}{RR}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StructuralUnit {
    Wing {
        name: String,
        unit_prefix: String,
        units_per_wing: u32,
    },
    Block {
        name: String,
        block_prefix: String,
        floor_count: u32,
        units_per_floor: u32,
    },
}

impl StructuralUnit {
    pub fn name(&self) -> &str {
        match self {
            StructuralUnit::Wing { name, .. } | StructuralUnit::Block { name, .. } => name,
        }
    }

    pub fn housing_type(&self) -> HousingType {
        match self {
            StructuralUnit::Wing { .. } => HousingType::Villa,
            StructuralUnit::Block { .. } => HousingType::Flat,
        }
    }

    pub fn unit_count(&self) -> u32 {
        match self {
            StructuralUnit::Wing { units_per_wing, .. } => *units_per_wing,
            StructuralUnit::Block {
                floor_count,
                units_per_floor,
                ..
            } => floor_count.saturating_mul(*units_per_floor),
        }
    }
}

/// Role an invite may grant. Admins are never invited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InviteRole {
    Tenant,
    Guard,
}

impl InviteRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            InviteRole::Tenant => "tenant",
            InviteRole::Guard => "guard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "tenant" => Some(InviteRole::Tenant),
            "guard" => Some(InviteRole::Guard),
            _ => None,
        }
    }
}

impl From<InviteRole> for Role {
    fn from(role: InviteRole) -> Self {
        match role {
            InviteRole::Tenant => Role::Tenant,
            InviteRole::Guard => Role::Guard,
        }
    }
}

/// Recorded intent to let one email register under a role and unit.
/// Never deleted; `is_registered` flips once the account exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteRecord {
    pub id: Uuid,
    pub email: String,
    pub role: InviteRole,
    pub target_unit: Option<String>,
    pub invited_at: DateTime<Utc>,
    pub invited_by: Uuid,
    pub is_registered: bool,
    pub registered_at: Option<DateTime<Utc>>,
}

impl InviteRecord {
    pub fn is_outstanding(&self) -> bool {
        !self.is_registered
    }

    pub fn targets(&self, unit_id: &str) -> bool {
        self.target_unit.as_deref() == Some(unit_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ContactInfo {
    pub phone: Option<String>,
    #[validate(email(message = "Valid contact email required"))]
    pub email: Option<String>,
}

/// Property aggregate: owns its structure and invite list.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Property {
    pub id: Uuid,

    #[validate(length(min = 2, max = 200, message = "Society name must be between 2 and 200 characters"))]
    pub name: String,

    #[validate(length(min = 5, max = 500, message = "Society address must be between 5 and 500 characters"))]
    pub address: String,

    pub housing_type: HousingType,
    pub admin_id: Uuid,
    pub is_enrollment_complete: bool,
    pub structures: Vec<StructuralUnit>,

    #[validate(nested)]
    pub contact: ContactInfo,
    pub additional_info: Option<String>,
    pub invites: Vec<InviteRecord>,

    /// Bumped on every persisted write; updates are conditional on it.
    pub version: i64,

    // Audit fields
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl Property {
    pub fn new(
        name: String,
        address: String,
        housing_type: HousingType,
        admin_id: Uuid,
    ) -> Result<Self, validator::ValidationErrors> {
        let property = Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            address: address.trim().to_string(),
            housing_type,
            admin_id,
            is_enrollment_complete: false,
            structures: Vec::new(),
            contact: ContactInfo::default(),
            additional_info: None,
            invites: Vec::new(),
            version: 0,
            created_at: Utc::now(),
            modified_at: None,
        };

        property.validate()?;
        Ok(property)
    }

    pub fn total_units(&self) -> u32 {
        self.structures.iter().map(StructuralUnit::unit_count).sum()
    }

    pub fn outstanding_invite_for(&self, email: &str) -> Option<&InviteRecord> {
        self.invites
            .iter()
            .find(|invite| invite.email == email && invite.is_outstanding())
    }

    pub fn outstanding_invite_mut(&mut self, email: &str, role: InviteRole) -> Option<&mut InviteRecord> {
        self.invites
            .iter_mut()
            .find(|invite| invite.email == email && invite.role == role && invite.is_outstanding())
    }

    pub fn touch(&mut self) {
        self.modified_at = Some(Utc::now());
    }
}
