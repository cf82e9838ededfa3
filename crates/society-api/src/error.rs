// ============================================================================
// Society API - Error Mapping
// File: crates/society-api/src/error.rs
// ============================================================================

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use society_core::{DomainError, ErrorKind};
use thiserror::Error;
use validator::ValidationErrors;

use crate::response::ApiResponse;

const FIELD_OTP: &str = "otp";
const FIELD_FORM: &str = "form";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Request body failed validation; `otp_only` when the code was the only bad field.
    #[error("{message}")]
    Validation { message: String, otp_only: bool },

    #[error("Authentication required")]
    Unauthorized,

    #[error("Too many OTP requests. Please wait a minute and try again.")]
    RateLimited,
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let fields = errors.field_errors();
        let mut names: Vec<_> = fields.keys().cloned().collect();
        names.sort();

        let message = names
            .iter()
            .filter_map(|name| fields.get(name))
            .flat_map(|errs| errs.iter())
            .map(|err| {
                err.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid {}", err.code))
            })
            .collect::<Vec<_>>()
            .join("; ");

        ApiError::Validation {
            message: if message.is_empty() { "Validation failed".into() } else { message },
            otp_only: names.len() == 1 && names[0] == FIELD_OTP,
        }
    }
}

/// Registration and invite reasons are all 400 so the client can show them
/// inline; only session, lookup, and infrastructure failures use other codes.
fn status_for(err: &DomainError) -> StatusCode {
    match err {
        DomainError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        DomainError::AccountInactive | DomainError::Forbidden => StatusCode::FORBIDDEN,
        DomainError::PropertyNotFound | DomainError::AccountNotFound => StatusCode::NOT_FOUND,
        DomainError::ConcurrentModification => StatusCode::CONFLICT,
        DomainError::DatabaseError(_) | DomainError::CacheError(_) => StatusCode::SERVICE_UNAVAILABLE,
        DomainError::DeliveryFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        other => match other.kind() {
            ErrorKind::Internal | ErrorKind::Transient => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        },
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, field) = match self {
            ApiError::Domain(err) => {
                let status = status_for(&err);
                let field = if err.is_otp() {
                    Some(FIELD_OTP)
                } else if status == StatusCode::BAD_REQUEST {
                    Some(FIELD_FORM)
                } else {
                    None
                };
                let message = match err.kind() {
                    ErrorKind::Internal => {
                        tracing::error!("Internal error: {}", err);
                        "Internal server error".to_string()
                    }
                    ErrorKind::Transient => {
                        tracing::error!("Transient failure: {}", err);
                        if matches!(err, DomainError::DeliveryFailed(_)) {
                            "Failed to send email. Please try again.".to_string()
                        } else {
                            "Service temporarily unavailable".to_string()
                        }
                    }
                    _ => {
                        tracing::warn!("Request rejected: {}", err);
                        err.to_string()
                    }
                };
                (status, err.code(), message, field)
            }
            ApiError::Validation { message, otp_only } => {
                tracing::warn!("Validation failed: {}", message);
                let field = if otp_only { FIELD_OTP } else { FIELD_FORM };
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message, Some(field))
            }
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required".to_string(),
                None,
            ),
            ApiError::RateLimited => {
                tracing::warn!("OTP request rate limited");
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    "RATE_LIMITED",
                    ApiError::RateLimited.to_string(),
                    None,
                )
            }
        };

        (status, Json(ApiResponse::error(code, &message, field))).into_response()
    }
}
