// ============================================================================
// Society Core - Unit Inventory
// File: crates/society-core/src/services/unit_inventory.rs
// ============================================================================
//! Derives every villa/flat identifier from a property's structure and
//! classifies each one against registered accounts and invites.
//!
//! Enumeration order is declaration order of structures, then ascending
//! index (wings) or floor then room (blocks). The same property always yields
//! the same sequence.

use std::collections::HashSet;
use std::sync::Arc;

use society_shared::constants::MAX_UNIT_INDEX;
use tracing::debug;
use uuid::Uuid;

use crate::domain::{
    Account, ClassifiedUnit, HousingType, Property, Role, StructuralUnit, UnitSlot, UnitStatus,
};
use crate::error::DomainError;
use crate::repositories::{AccountRepository, PropertyRepository};

/// Slots of a single structure.
pub fn enumerate(structure: &StructuralUnit) -> Vec<UnitSlot> {
    match structure {
        StructuralUnit::Wing {
            name,
            unit_prefix,
            units_per_wing,
        } => (1..=*units_per_wing)
            .map(|index| {
                let unit_id = format!("{}{:02}", unit_prefix, index);
                UnitSlot {
                    display_label: format!("{} ({})", unit_id, name),
                    unit_id,
                    structure_name: name.clone(),
                    floor: None,
                    room: None,
                }
            })
            .collect(),
        StructuralUnit::Block {
            name,
            block_prefix,
            floor_count,
            units_per_floor,
        } => (1..=*floor_count)
            .flat_map(|floor| (1..=*units_per_floor).map(move |room| (floor, room)))
            .map(|(floor, room)| {
                let unit_id = format!("{}{:02}{:02}", block_prefix, floor, room);
                UnitSlot {
                    display_label: format!("{} ({} - Floor {} - Room {})", unit_id, name, floor, room),
                    unit_id,
                    structure_name: name.clone(),
                    floor: Some(floor),
                    room: Some(room),
                }
            })
            .collect(),
    }
}

pub fn enumerate_units(property: &Property) -> Vec<UnitSlot> {
    property.structures.iter().flat_map(enumerate).collect()
}

fn count_in_range(count: u32) -> bool {
    (1..=MAX_UNIT_INDEX).contains(&count)
}

/// Checks a proposed structure list before it is stored on a property.
pub fn validate_structures(
    housing_type: HousingType,
    structures: &[StructuralUnit],
) -> Result<(), DomainError> {
    if structures.is_empty() {
        let what = match housing_type {
            HousingType::Villa => "wing",
            HousingType::Flat => "block",
        };
        return Err(DomainError::ValidationError(format!(
            "At least one {} is required for {} complexes",
            what,
            housing_type.as_str()
        )));
    }

    for structure in structures {
        if structure.housing_type() != housing_type {
            return Err(DomainError::HousingTypeMismatch(structure.name().to_string()));
        }
        let (prefix, counts_ok) = match structure {
            StructuralUnit::Wing {
                unit_prefix,
                units_per_wing,
                ..
            } => (unit_prefix, count_in_range(*units_per_wing)),
            StructuralUnit::Block {
                block_prefix,
                floor_count,
                units_per_floor,
                ..
            } => (
                block_prefix,
                count_in_range(*floor_count) && count_in_range(*units_per_floor),
            ),
        };
        if structure.name().trim().is_empty() || prefix.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "Structure name and prefix are required".into(),
            ));
        }
        if !counts_ok {
            return Err(DomainError::ValidationError(format!(
                "Unit counts for {} must be between 1 and {}",
                structure.name(),
                MAX_UNIT_INDEX
            )));
        }
    }

    let mut seen = HashSet::new();
    for slot in structures.iter().flat_map(enumerate) {
        if !seen.insert(slot.unit_id.clone()) {
            return Err(DomainError::DuplicateUnitId(slot.unit_id));
        }
    }
    Ok(())
}

/// Status of one unit.
///
/// Occupied: an active tenant account lives there, or a registered invite
/// targeted it. Reserved: not occupied, but an outstanding invite targets it.
pub fn status_of(property: &Property, accounts: &[Account], unit_id: &str) -> UnitStatus {
    let lived_in = accounts
        .iter()
        .any(|account| account.property_id == Some(property.id) && account.occupies(unit_id));
    let registered_invite = property
        .invites
        .iter()
        .any(|invite| invite.is_registered && invite.targets(unit_id));
    if lived_in || registered_invite {
        return UnitStatus::Occupied;
    }

    let outstanding_invite = property
        .invites
        .iter()
        .any(|invite| invite.is_outstanding() && invite.targets(unit_id));
    if outstanding_invite {
        UnitStatus::Reserved
    } else {
        UnitStatus::Available
    }
}

pub fn classify(property: &Property, accounts: &[Account]) -> Vec<ClassifiedUnit> {
    enumerate_units(property)
        .into_iter()
        .map(|slot| {
            let status = status_of(property, accounts, &slot.unit_id);
            ClassifiedUnit { slot, status }
        })
        .collect()
}

fn with_status(property: &Property, accounts: &[Account], wanted: UnitStatus) -> Vec<UnitSlot> {
    classify(property, accounts)
        .into_iter()
        .filter(|unit| unit.status == wanted)
        .map(|unit| unit.slot)
        .collect()
}

pub fn available(property: &Property, accounts: &[Account]) -> Vec<UnitSlot> {
    with_status(property, accounts, UnitStatus::Available)
}

pub fn reserved(property: &Property, accounts: &[Account]) -> Vec<UnitSlot> {
    with_status(property, accounts, UnitStatus::Reserved)
}

pub fn occupied(property: &Property, accounts: &[Account]) -> Vec<UnitSlot> {
    with_status(property, accounts, UnitStatus::Occupied)
}

/// Repository-backed inventory queries for the admin and guard views.
pub struct UnitInventoryService {
    property_repo: Arc<dyn PropertyRepository>,
    account_repo: Arc<dyn AccountRepository>,
}

impl UnitInventoryService {
    pub fn new(
        property_repo: Arc<dyn PropertyRepository>,
        account_repo: Arc<dyn AccountRepository>,
    ) -> Self {
        Self {
            property_repo,
            account_repo,
        }
    }

    async fn load(&self, property_id: &Uuid) -> Result<(Property, Vec<Account>), DomainError> {
        let property = self
            .property_repo
            .find_by_id(property_id)
            .await?
            .ok_or(DomainError::PropertyNotFound)?;
        if !property.is_enrollment_complete {
            return Err(DomainError::EnrollmentIncomplete);
        }
        let tenants = self
            .account_repo
            .list_by_property(property_id, Some(Role::Tenant))
            .await?;
        debug!(
            "Loaded property {} with {} tenants for inventory",
            property.id,
            tenants.len()
        );
        Ok((property, tenants))
    }

    pub async fn available_units(&self, property_id: &Uuid) -> Result<Vec<UnitSlot>, DomainError> {
        let (property, tenants) = self.load(property_id).await?;
        Ok(available(&property, &tenants))
    }

    pub async fn occupied_units(&self, property_id: &Uuid) -> Result<Vec<UnitSlot>, DomainError> {
        let (property, tenants) = self.load(property_id).await?;
        Ok(occupied(&property, &tenants))
    }

    pub async fn inventory(&self, property_id: &Uuid) -> Result<Vec<ClassifiedUnit>, DomainError> {
        let (property, tenants) = self.load(property_id).await?;
        Ok(classify(&property, &tenants))
    }
}
