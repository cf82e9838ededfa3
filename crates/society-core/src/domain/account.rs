// ============================================================================
// Society Core - Account Entity
// File: crates/society-core/src/domain/account.rs
// Description: Admin, tenant, and guard accounts
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Account role enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Tenant,
    Guard,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Tenant => "tenant",
            Role::Guard => "guard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Role::Admin),
            "tenant" => Some(Role::Tenant),
            "guard" => Some(Role::Guard),
            _ => None,
        }
    }
}

/// Account entity
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Account {
    pub id: Uuid,

    #[validate(length(min = 2, max = 100, message = "Name must be between 2 and 100 characters"))]
    pub name: String,

    #[validate(email(message = "Valid email is required"))]
    pub email: String,

    pub phone: Option<String>,
    pub role: Role,

    #[serde(skip_serializing)]
    pub password_hash: String,

    pub property_id: Option<Uuid>,
    /// Villa or flat identifier; set for tenants only.
    pub assigned_unit: Option<String>,
    pub is_active: bool,

    // Audit fields
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
    pub last_login: Option<DateTime<Utc>>,
}

impl Account {
    pub fn new(
        name: String,
        email: String,
        role: Role,
        password_hash: String,
        property_id: Option<Uuid>,
        assigned_unit: Option<String>,
    ) -> Result<Self, validator::ValidationErrors> {
        let account = Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            email: email.trim().to_lowercase(),
            phone: None,
            role,
            password_hash,
            property_id,
            assigned_unit: assigned_unit.map(|u| u.trim().to_string()),
            is_active: true,
            created_at: Utc::now(),
            modified_at: None,
            last_login: None,
        };

        account.validate()?;
        Ok(account)
    }

    pub fn with_phone(mut self, phone: Option<String>) -> Self {
        self.phone = phone.map(|p| p.trim().to_string()).filter(|p| !p.is_empty());
        self
    }

    pub fn can_login(&self) -> bool {
        self.is_active
    }

    pub fn record_login(&mut self) {
        let now = Utc::now();
        self.last_login = Some(now);
        self.modified_at = Some(now);
    }

    /// True when this account is an active tenant living in `unit_id`.
    pub fn occupies(&self, unit_id: &str) -> bool {
        self.is_active
            && self.role == Role::Tenant
            && self.assigned_unit.as_deref() == Some(unit_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_account_normalizes() {
        let account = Account::new(
            " Asha ".to_string(),
            "Asha@Example.com".to_string(),
            Role::Tenant,
            "hash".to_string(),
            None,
            Some(" A01 ".to_string()),
        )
        .unwrap();
        assert_eq!(account.name, "Asha");
        assert_eq!(account.email, "asha@example.com");
        assert_eq!(account.assigned_unit.as_deref(), Some("A01"));
        assert!(account.occupies("A01"));
    }

    #[test]
    fn test_invalid_email_rejected() {
        let account = Account::new(
            "Asha".to_string(),
            "nope".to_string(),
            Role::Guard,
            "hash".to_string(),
            None,
            None,
        );
        assert!(account.is_err());
    }

    #[test]
    fn test_guard_never_occupies() {
        let mut account = Account::new(
            "Ravi".to_string(),
            "ravi@example.com".to_string(),
            Role::Guard,
            "hash".to_string(),
            None,
            Some("A01".to_string()),
        )
        .unwrap();
        assert!(!account.occupies("A01"));
        account.role = Role::Tenant;
        account.is_active = false;
        assert!(!account.occupies("A01"));
    }
}
