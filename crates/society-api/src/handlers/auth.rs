// ============================================================================
// Society API - Auth Handlers
// File: crates/society-api/src/handlers/auth.rs
// ============================================================================
//! Admin onboarding, login, and current-account lookup

use axum::{extract::State, http::StatusCode, Json};
use society_core::services::AdminRegistration;
use society_shared::utils::normalize_email;
use validator::Validate;

use crate::dto::{
    AccountDto, AccountResponse, AdminRegisteredResponse, LoginRequest, OtpSentResponse,
    PropertySummaryDto, RegisterAdminRequest, RequestAdminOtpRequest, SessionResponse,
};
use crate::error::ApiError;
use crate::extractors::CurrentSession;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Applies the per-email quota shared by both OTP request endpoints.
pub(crate) fn throttle_otp(state: &AppState, email: &str) -> Result<(), ApiError> {
    let key = normalize_email(email).unwrap_or_else(|| email.trim().to_lowercase());
    if state.otp_limiter.allow(&key) {
        Ok(())
    } else {
        Err(ApiError::RateLimited)
    }
}

/// POST /api/auth/request-admin-otp
pub async fn request_admin_otp(
    State(state): State<AppState>,
    Json(payload): Json<RequestAdminOtpRequest>,
) -> Result<Json<ApiResponse<OtpSentResponse>>, ApiError> {
    payload.validate()?;
    throttle_otp(&state, &payload.email)?;

    let email = state.registration.request_admin_otp(&payload.email).await?;
    Ok(Json(ApiResponse::success(OtpSentResponse {
        email,
        message: "OTP sent to your email".to_string(),
    })))
}

/// POST /api/auth/register-admin
pub async fn register_admin(
    State(state): State<AppState>,
    Json(payload): Json<RegisterAdminRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AdminRegisteredResponse>>), ApiError> {
    payload.validate()?;

    let (account, property) = state
        .registration
        .register_admin(AdminRegistration {
            name: payload.name,
            email: payload.email,
            password: payload.password,
            phone: payload.phone,
            society_name: payload.society_name,
            society_address: payload.society_address,
            housing_type: payload.housing_type,
            otp: payload.otp,
        })
        .await?;
    let token = state.auth.issue_session(&account)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(AdminRegisteredResponse {
            user: AccountDto::from(&account),
            property: PropertySummaryDto::from(&property),
            token,
        })),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<SessionResponse>>, ApiError> {
    payload.validate()?;

    let result = state.auth.login(&payload.email, &payload.password).await?;
    Ok(Json(ApiResponse::success(SessionResponse {
        user: AccountDto::from(&result.account),
        token: result.token,
    })))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    CurrentSession(claims): CurrentSession,
) -> Result<Json<ApiResponse<AccountResponse>>, ApiError> {
    let account = state.auth.current_account(&claims).await?;
    Ok(Json(ApiResponse::success(AccountResponse {
        user: AccountDto::from(&account),
    })))
}
