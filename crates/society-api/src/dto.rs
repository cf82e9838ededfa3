// ============================================================================
// Society API - Request/Response DTOs
// File: crates/society-api/src/dto.rs
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use society_core::{Account, ContactInfo, HousingType, InviteRecord, InviteRole, Property, StructuralUnit};
use society_shared::constants::{MAX_PASSWORD_LENGTH, MAX_UNIT_INDEX, MIN_PASSWORD_LENGTH, OTP_LENGTH};
use uuid::Uuid;
use validator::{Validate, ValidationError};

// `validator` length bounds are `u64`; mirror the shared `usize` constants.
const MIN_PASSWORD_LEN: u64 = MIN_PASSWORD_LENGTH as u64;
const MAX_PASSWORD_LEN: u64 = MAX_PASSWORD_LENGTH as u64;
const OTP_LEN: u64 = OTP_LENGTH as u64;

// ----------------------------------------------------------------------------
// Requests
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct RequestAdminOtpRequest {
    #[validate(email(message = "Valid email is required"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterAdminRequest {
    #[validate(length(min = 2, max = 100, message = "Name must be at least 2 characters"))]
    pub name: String,

    #[validate(email(message = "Valid email is required"))]
    pub email: String,

    #[serde(default, alias = "phoneNumber")]
    pub phone: Option<String>,

    #[validate(length(min = MIN_PASSWORD_LEN, max = MAX_PASSWORD_LEN, message = "Password must be at least 6 characters"))]
    pub password: String,

    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,

    #[validate(length(min = 2, max = 200, message = "Society name is required"))]
    pub society_name: String,

    #[validate(length(min = 5, max = 500, message = "Society address is required"))]
    pub society_address: String,

    pub housing_type: HousingType,

    #[validate(length(equal = OTP_LEN, message = "OTP must be 6 digits"))]
    pub otp: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Valid email is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RequestInviteOtpRequest {
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,

    #[validate(email(message = "Valid email is required"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct GenerateInviteRequest {
    pub role: InviteRole,

    #[validate(email(message = "Valid email is required"))]
    pub email: String,

    #[serde(default, alias = "apartmentNumber", alias = "flatNumber")]
    pub unit: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AcceptInviteRequest {
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,

    #[validate(length(min = 2, max = 100, message = "Name must be at least 2 characters"))]
    pub name: String,

    #[validate(email(message = "Valid email is required"))]
    pub email: String,

    #[serde(default, alias = "phoneNumber")]
    pub phone: Option<String>,

    #[validate(length(min = MIN_PASSWORD_LEN, max = MAX_PASSWORD_LEN, message = "Password must be at least 6 characters"))]
    pub password: String,

    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,

    #[validate(length(equal = OTP_LEN, message = "OTP must be 6 digits"))]
    pub otp: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CompleteEnrollmentRequest {
    #[validate(
        length(min = 1, message = "At least one wing or block is required"),
        custom(function = "validate_structure_sizes")
    )]
    pub structures: Vec<StructuralUnit>,

    #[serde(default)]
    #[validate(nested)]
    pub contact: ContactInfo,

    #[serde(default)]
    pub additional_info: Option<String>,
}

fn validate_structure_sizes(structures: &[StructuralUnit]) -> Result<(), ValidationError> {
    let within = |count: u32| (1..=MAX_UNIT_INDEX).contains(&count);
    let ok = structures.iter().all(|structure| match structure {
        StructuralUnit::Wing { units_per_wing, .. } => within(*units_per_wing),
        StructuralUnit::Block {
            floor_count,
            units_per_floor,
            ..
        } => within(*floor_count) && within(*units_per_floor),
    });
    if ok {
        Ok(())
    } else {
        let mut err = ValidationError::new("structure_size");
        err.message = Some("Wing, floor, and room counts must be between 1 and 99".into());
        Err(err)
    }
}

// ----------------------------------------------------------------------------
// Responses
// ----------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct OtpSentResponse {
    pub email: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDto {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_unit: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Account> for AccountDto {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            name: account.name.clone(),
            email: account.email.clone(),
            phone: account.phone.clone(),
            role: account.role.as_str().to_string(),
            property_id: account.property_id,
            assigned_unit: account.assigned_unit.clone(),
            created_at: account.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySummaryDto {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub housing_type: HousingType,
    pub is_enrollment_complete: bool,
}

impl From<&Property> for PropertySummaryDto {
    fn from(property: &Property) -> Self {
        Self {
            id: property.id,
            name: property.name.clone(),
            address: property.address.clone(),
            housing_type: property.housing_type,
            is_enrollment_complete: property.is_enrollment_complete,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: AccountDto,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct AdminRegisteredResponse {
    pub user: AccountDto,
    pub property: PropertySummaryDto,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub user: AccountDto,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteResponse {
    pub invite_link: String,
    pub token: String,
    pub expires_in_minutes: i64,
    pub invite: InviteRecord,
}

#[derive(Debug, Serialize)]
pub struct UnitsResponse<T: Serialize> {
    pub units: Vec<T>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accept(password: &str, confirm: &str, otp: &str) -> AcceptInviteRequest {
        AcceptInviteRequest {
            token: "t".into(),
            name: "Nisha".into(),
            email: "nisha@x.com".into(),
            phone: None,
            password: password.into(),
            confirm_password: confirm.into(),
            otp: otp.into(),
        }
    }

    #[test]
    fn test_accept_validation() {
        assert!(accept("abc123", "abc123", "123456").validate().is_ok());
        assert!(accept("abc123", "abc124", "123456").validate().is_err());
        assert!(accept("abc123", "abc123", "12345").validate().is_err());
        assert!(accept("ab1", "ab1", "123456").validate().is_err());
    }

    #[test]
    fn test_enrollment_body_uses_tagged_structures() {
        let body: CompleteEnrollmentRequest = serde_json::from_str(
            r#"{"structures":[{"kind":"block","name":"B1","block_prefix":"B","floor_count":2,"units_per_floor":2}]}"#,
        )
        .unwrap();
        assert_eq!(body.structures[0].unit_count(), 4);
    }

    #[test]
    fn test_enrollment_rejects_oversized_structures() {
        let body: CompleteEnrollmentRequest = serde_json::from_str(
            r#"{"structures":[{"kind":"block","name":"B1","block_prefix":"B","floor_count":4294967295,"units_per_floor":4294967295}]}"#,
        )
        .unwrap();
        assert!(body.validate().is_err());

        let body: CompleteEnrollmentRequest = serde_json::from_str(
            r#"{"structures":[{"kind":"wing","name":"A","unit_prefix":"A","units_per_wing":99}]}"#,
        )
        .unwrap();
        assert!(body.validate().is_ok());
    }
}
