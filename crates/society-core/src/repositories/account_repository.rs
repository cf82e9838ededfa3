//! Account repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;
use crate::domain::{Account, Role};
use crate::error::DomainError;

#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Account>, DomainError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DomainError>;
    async fn list_by_property(&self, property_id: &Uuid, role: Option<Role>) -> Result<Vec<Account>, DomainError>;
    /// Fails with `AccountExists` when the email is already taken.
    async fn create(&self, account: &Account) -> Result<Account, DomainError>;
    async fn update(&self, account: &Account) -> Result<Account, DomainError>;
    async fn delete(&self, id: &Uuid) -> Result<(), DomainError>;
}
