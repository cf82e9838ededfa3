//! Property enrollment: recording the wing/block structure an admin manages

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::domain::{ContactInfo, Property, StructuralUnit};
use crate::error::DomainError;
use crate::repositories::PropertyRepository;
use crate::services::unit_inventory::validate_structures;

#[derive(Debug, Clone)]
pub struct EnrollmentInput {
    pub structures: Vec<StructuralUnit>,
    pub contact: ContactInfo,
    pub additional_info: Option<String>,
}

pub struct EnrollmentService {
    property_repo: Arc<dyn PropertyRepository>,
}

impl EnrollmentService {
    pub fn new(property_repo: Arc<dyn PropertyRepository>) -> Self {
        Self { property_repo }
    }

    pub async fn property(&self, property_id: &Uuid) -> Result<Property, DomainError> {
        self.property_repo
            .find_by_id(property_id)
            .await?
            .ok_or(DomainError::PropertyNotFound)
    }

    /// Replaces the structure and marks enrollment complete.
    ///
    /// Re-enrolling is allowed; existing invites and accounts keep their unit
    /// strings even if the new structure no longer produces them.
    pub async fn complete_enrollment(
        &self,
        property_id: &Uuid,
        input: EnrollmentInput,
    ) -> Result<Property, DomainError> {
        input.contact.validate()?;

        let mut property = self.property(property_id).await?;
        validate_structures(property.housing_type, &input.structures)?;

        property.structures = input.structures;
        property.contact = input.contact;
        property.additional_info = input
            .additional_info
            .map(|info| info.trim().to_string())
            .filter(|info| !info.is_empty());
        property.is_enrollment_complete = true;
        property.touch();

        let stored = self.property_repo.update(&property).await?;
        info!(
            "Enrollment completed for property {} ({} units)",
            stored.id,
            stored.total_units()
        );
        Ok(stored)
    }
}
