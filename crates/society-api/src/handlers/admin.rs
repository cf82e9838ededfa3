// ============================================================================
// Society API - Admin Handlers
// File: crates/society-api/src/handlers/admin.rs
// ============================================================================
//! Property view, enrollment, and unit inventory

use axum::{extract::State, Json};
use society_core::services::EnrollmentInput;
use society_core::{ClassifiedUnit, Property, Role};
use society_shared::SelectOption;
use validator::Validate;

use crate::dto::{CompleteEnrollmentRequest, UnitsResponse};
use crate::error::ApiError;
use crate::extractors::CurrentSession;
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /api/admin/property
pub async fn property(
    State(state): State<AppState>,
    session: CurrentSession,
) -> Result<Json<ApiResponse<Property>>, ApiError> {
    let claims = session.require(&[Role::Admin])?;
    let property = state.enrollment.property(&claims.property()?).await?;
    Ok(Json(ApiResponse::success(property)))
}

/// POST /api/admin/complete-enrollment
pub async fn complete_enrollment(
    State(state): State<AppState>,
    session: CurrentSession,
    Json(payload): Json<CompleteEnrollmentRequest>,
) -> Result<Json<ApiResponse<Property>>, ApiError> {
    let claims = session.require(&[Role::Admin])?;
    payload.validate()?;

    let property = state
        .enrollment
        .complete_enrollment(
            &claims.property()?,
            EnrollmentInput {
                structures: payload.structures,
                contact: payload.contact,
                additional_info: payload.additional_info,
            },
        )
        .await?;
    Ok(Json(ApiResponse::success(property)))
}

/// GET /api/admin/available-units
pub async fn available_units(
    State(state): State<AppState>,
    session: CurrentSession,
) -> Result<Json<ApiResponse<UnitsResponse<SelectOption>>>, ApiError> {
    let claims = session.require(&[Role::Admin])?;
    let units = state.inventory.available_units(&claims.property()?).await?;
    Ok(Json(ApiResponse::success(UnitsResponse {
        units: units.iter().map(|slot| slot.to_option()).collect(),
    })))
}

/// GET /api/admin/occupied-units and /api/guard/occupied-units
pub async fn occupied_units(
    State(state): State<AppState>,
    session: CurrentSession,
) -> Result<Json<ApiResponse<UnitsResponse<SelectOption>>>, ApiError> {
    let claims = session.require(&[Role::Admin, Role::Guard])?;
    let units = state.inventory.occupied_units(&claims.property()?).await?;
    Ok(Json(ApiResponse::success(UnitsResponse {
        units: units.iter().map(|slot| slot.to_option()).collect(),
    })))
}

/// GET /api/admin/units
pub async fn units(
    State(state): State<AppState>,
    session: CurrentSession,
) -> Result<Json<ApiResponse<UnitsResponse<ClassifiedUnit>>>, ApiError> {
    let claims = session.require(&[Role::Admin])?;
    let units = state.inventory.inventory(&claims.property()?).await?;
    Ok(Json(ApiResponse::success(UnitsResponse { units })))
}
