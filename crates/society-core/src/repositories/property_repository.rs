//! Property repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;
use crate::domain::Property;
use crate::error::DomainError;

#[async_trait]
pub trait PropertyRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Property>, DomainError>;
    async fn find_by_admin(&self, admin_id: &Uuid) -> Result<Option<Property>, DomainError>;
    async fn create(&self, property: &Property) -> Result<Property, DomainError>;
    /// Compare-and-swap on `property.version`. The stored copy must still carry
    /// that version, otherwise `ConcurrentModification`. Returns the stored
    /// aggregate with its version bumped.
    async fn update(&self, property: &Property) -> Result<Property, DomainError>;
}
