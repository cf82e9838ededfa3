// ============================================================================
// Society Core - Invite Ledger
// File: crates/society-core/src/services/invite_ledger.rs
// ============================================================================
//! Outstanding invites per property.
//!
//! Invariants kept here: one outstanding invite per email within a property,
//! and a tenant unit is never promised twice while it is occupied or reserved.
//! Property writes are compare-and-swap on the aggregate version and retried a
//! bounded number of times.

use std::sync::Arc;

use society_shared::constants::MAX_PROPERTY_WRITE_RETRIES;
use society_shared::utils::{mask_email, normalize_email};
use society_shared::Clock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{InviteRecord, InviteRole, Property, Role, UnitStatus};
use crate::error::DomainError;
use crate::repositories::{AccountRepository, PropertyRepository};
use crate::services::unit_inventory;

pub struct InviteLedger {
    property_repo: Arc<dyn PropertyRepository>,
    account_repo: Arc<dyn AccountRepository>,
    clock: Arc<dyn Clock>,
}

impl InviteLedger {
    pub fn new(
        property_repo: Arc<dyn PropertyRepository>,
        account_repo: Arc<dyn AccountRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            property_repo,
            account_repo,
            clock,
        }
    }

    async fn load(&self, property_id: &Uuid) -> Result<Property, DomainError> {
        self.property_repo
            .find_by_id(property_id)
            .await?
            .ok_or(DomainError::PropertyNotFound)
    }

    /// Records a new invite on the property.
    pub async fn create_invite(
        &self,
        property_id: &Uuid,
        invited_by: &Uuid,
        email: &str,
        role: InviteRole,
        target_unit: Option<&str>,
    ) -> Result<InviteRecord, DomainError> {
        let email = normalize_email(email)
            .ok_or_else(|| DomainError::ValidationError("Valid email is required".into()))?;

        // 1. Email must not belong to an account yet
        if self.account_repo.find_by_email(&email).await?.is_some() {
            warn!("Invite rejected: account exists for {}", mask_email(&email));
            return Err(DomainError::AccountExists(email));
        }

        let target_unit = match role {
            InviteRole::Tenant => Some(
                target_unit
                    .map(str::trim)
                    .filter(|unit| !unit.is_empty())
                    .ok_or(DomainError::UnitRequired)?
                    .to_string(),
            ),
            InviteRole::Guard => None,
        };

        for attempt in 1..=MAX_PROPERTY_WRITE_RETRIES {
            let mut property = self.load(property_id).await?;

            // 2. One outstanding invite per email
            if property.outstanding_invite_for(&email).is_some() {
                warn!("Invite rejected: {} already invited", mask_email(&email));
                return Err(DomainError::AlreadyInvited(email));
            }

            // 3. Tenant unit must exist and be free
            if let Some(unit) = &target_unit {
                self.ensure_unit_free(&property, unit).await?;
            }

            // 4. Append and persist
            let record = InviteRecord {
                id: Uuid::new_v4(),
                email: email.clone(),
                role,
                target_unit: target_unit.clone(),
                invited_at: self.clock.now(),
                invited_by: *invited_by,
                is_registered: false,
                registered_at: None,
            };
            property.invites.push(record.clone());
            property.touch();

            match self.property_repo.update(&property).await {
                Ok(_) => {
                    info!(
                        "Invited {} as {} to property {}",
                        mask_email(&email),
                        role.as_str(),
                        property_id
                    );
                    return Ok(record);
                }
                Err(DomainError::ConcurrentModification) => {
                    warn!("Property {} changed during invite (attempt {})", property_id, attempt);
                }
                Err(e) => return Err(e),
            }
        }

        Err(DomainError::ConcurrentModification)
    }

    async fn ensure_unit_free(&self, property: &Property, unit: &str) -> Result<(), DomainError> {
        let known = unit_inventory::enumerate_units(property);
        if !known.is_empty() && !known.iter().any(|slot| slot.unit_id == unit) {
            return Err(DomainError::UnknownUnit(unit.to_string()));
        }

        let tenants = self
            .account_repo
            .list_by_property(&property.id, Some(Role::Tenant))
            .await?;
        match unit_inventory::status_of(property, &tenants, unit) {
            UnitStatus::Available => Ok(()),
            status => {
                warn!("Unit {} on property {} is {:?}", unit, property.id, status);
                Err(DomainError::UnitTaken(unit.to_string()))
            }
        }
    }

    /// The unused invite matching `email` and `role`, without changing it.
    pub async fn find_outstanding(
        &self,
        property_id: &Uuid,
        email: &str,
        role: InviteRole,
    ) -> Result<InviteRecord, DomainError> {
        let property = self.load(property_id).await?;
        property
            .invites
            .iter()
            .find(|invite| invite.email == email && invite.role == role && invite.is_outstanding())
            .cloned()
            .ok_or(DomainError::NoSuchInvite)
    }

    /// Marks the matching unused invite as registered.
    pub async fn consume(
        &self,
        property_id: &Uuid,
        email: &str,
        role: InviteRole,
    ) -> Result<InviteRecord, DomainError> {
        for attempt in 1..=MAX_PROPERTY_WRITE_RETRIES {
            let mut property = self.load(property_id).await?;
            let now = self.clock.now();
            let record = {
                let invite = property
                    .outstanding_invite_mut(email, role)
                    .ok_or(DomainError::NoSuchInvite)?;
                invite.is_registered = true;
                invite.registered_at = Some(now);
                invite.clone()
            };
            property.touch();

            match self.property_repo.update(&property).await {
                Ok(_) => {
                    info!("Invite {} consumed for {}", record.id, mask_email(email));
                    return Ok(record);
                }
                Err(DomainError::ConcurrentModification) => {
                    warn!("Property {} changed during consume (attempt {})", property_id, attempt);
                }
                Err(e) => return Err(e),
            }
        }

        Err(DomainError::ConcurrentModification)
    }

    pub async fn list(&self, property_id: &Uuid) -> Result<Vec<InviteRecord>, DomainError> {
        Ok(self.load(property_id).await?.invites)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Account, HousingType, StructuralUnit};
    use crate::repositories::{InMemoryAccountRepository, InMemoryPropertyRepository};
    use society_shared::SystemClock;

    struct Fixture {
        ledger: InviteLedger,
        properties: Arc<InMemoryPropertyRepository>,
        accounts: Arc<InMemoryAccountRepository>,
        property: Property,
    }

    async fn fixture() -> Fixture {
        let properties = Arc::new(InMemoryPropertyRepository::new());
        let accounts = Arc::new(InMemoryAccountRepository::new());
        let mut property = Property::new(
            "Green Meadows".into(),
            "12 Lake Road".into(),
            HousingType::Villa,
            Uuid::new_v4(),
        )
        .unwrap();
        property.structures = vec![StructuralUnit::Wing {
            name: "A".into(),
            unit_prefix: "A".into(),
            units_per_wing: 3,
        }];
        property.is_enrollment_complete = true;
        properties.create(&property).await.unwrap();

        let ledger = InviteLedger::new(properties.clone(), accounts.clone(), Arc::new(SystemClock));
        Fixture {
            ledger,
            properties,
            accounts,
            property,
        }
    }

    #[tokio::test]
    async fn test_second_outstanding_invite_rejected() {
        let f = fixture().await;
        let admin = f.property.admin_id;
        f.ledger
            .create_invite(&f.property.id, &admin, "tenant@x.com", InviteRole::Tenant, Some("A01"))
            .await
            .unwrap();

        let again = f
            .ledger
            .create_invite(&f.property.id, &admin, "Tenant@X.com", InviteRole::Guard, None)
            .await;
        assert!(matches!(again, Err(DomainError::AlreadyInvited(_))));
    }

    #[tokio::test]
    async fn test_tenant_needs_unit() {
        let f = fixture().await;
        let result = f
            .ledger
            .create_invite(&f.property.id, &f.property.admin_id, "t@x.com", InviteRole::Tenant, Some("  "))
            .await;
        assert!(matches!(result, Err(DomainError::UnitRequired)));
    }

    #[tokio::test]
    async fn test_guard_invite_drops_unit() {
        let f = fixture().await;
        let record = f
            .ledger
            .create_invite(&f.property.id, &f.property.admin_id, "g@x.com", InviteRole::Guard, Some("A01"))
            .await
            .unwrap();
        assert_eq!(record.target_unit, None);
    }

    #[tokio::test]
    async fn test_existing_account_rejected() {
        let f = fixture().await;
        let account = Account::new("Ravi".into(), "ravi@x.com".into(), Role::Guard, "h".into(), Some(f.property.id), None)
            .unwrap();
        f.accounts.create(&account).await.unwrap();

        let result = f
            .ledger
            .create_invite(&f.property.id, &f.property.admin_id, "ravi@x.com", InviteRole::Guard, None)
            .await;
        assert!(matches!(result, Err(DomainError::AccountExists(_))));
    }

    #[tokio::test]
    async fn test_unit_taken_by_registered_tenant() {
        let f = fixture().await;
        let account = Account::new(
            "Asha".into(),
            "asha@x.com".into(),
            Role::Tenant,
            "h".into(),
            Some(f.property.id),
            Some("A02".into()),
        )
        .unwrap();
        f.accounts.create(&account).await.unwrap();

        let result = f
            .ledger
            .create_invite(&f.property.id, &f.property.admin_id, "new@x.com", InviteRole::Tenant, Some("A02"))
            .await;
        assert!(matches!(result, Err(DomainError::UnitTaken(unit)) if unit == "A02"));
    }

    #[tokio::test]
    async fn test_unit_reserved_by_outstanding_invite() {
        let f = fixture().await;
        let admin = f.property.admin_id;
        f.ledger
            .create_invite(&f.property.id, &admin, "one@x.com", InviteRole::Tenant, Some("A03"))
            .await
            .unwrap();
        let result = f
            .ledger
            .create_invite(&f.property.id, &admin, "two@x.com", InviteRole::Tenant, Some("A03"))
            .await;
        assert!(matches!(result, Err(DomainError::UnitTaken(_))));
    }

    #[tokio::test]
    async fn test_unknown_unit_rejected() {
        let f = fixture().await;
        let result = f
            .ledger
            .create_invite(&f.property.id, &f.property.admin_id, "t@x.com", InviteRole::Tenant, Some("Z99"))
            .await;
        assert!(matches!(result, Err(DomainError::UnknownUnit(_))));
    }

    #[tokio::test]
    async fn test_consume_flips_once() {
        let f = fixture().await;
        f.ledger
            .create_invite(&f.property.id, &f.property.admin_id, "t@x.com", InviteRole::Tenant, Some("A01"))
            .await
            .unwrap();

        let consumed = f.ledger.consume(&f.property.id, "t@x.com", InviteRole::Tenant).await.unwrap();
        assert!(consumed.is_registered);
        assert!(consumed.registered_at.is_some());

        let again = f.ledger.consume(&f.property.id, "t@x.com", InviteRole::Tenant).await;
        assert!(matches!(again, Err(DomainError::NoSuchInvite)));

        let stored = f.properties.find_by_id(&f.property.id).await.unwrap().unwrap();
        assert_eq!(stored.invites.len(), 1);
        assert!(stored.invites[0].is_registered);
    }

    #[tokio::test]
    async fn test_consume_requires_matching_role() {
        let f = fixture().await;
        f.ledger
            .create_invite(&f.property.id, &f.property.admin_id, "g@x.com", InviteRole::Guard, None)
            .await
            .unwrap();
        let result = f.ledger.consume(&f.property.id, "g@x.com", InviteRole::Tenant).await;
        assert!(matches!(result, Err(DomainError::NoSuchInvite)));
    }

    #[tokio::test]
    async fn test_reinvite_allowed_after_registration() {
        let f = fixture().await;
        let admin = f.property.admin_id;
        f.ledger
            .create_invite(&f.property.id, &admin, "g@x.com", InviteRole::Guard, None)
            .await
            .unwrap();
        f.ledger.consume(&f.property.id, "g@x.com", InviteRole::Guard).await.unwrap();

        // No account was created in this test, so only the invite list matters.
        assert!(f
            .ledger
            .create_invite(&f.property.id, &admin, "g@x.com", InviteRole::Guard, None)
            .await
            .is_ok());
        assert_eq!(f.ledger.list(&f.property.id).await.unwrap().len(), 2);
    }
}
