// ============================================================================
// Society API - Invite Handlers
// File: crates/society-api/src/handlers/invites.rs
// ============================================================================

use axum::{extract::State, http::StatusCode, Json};
use society_core::services::InviteAcceptance;
use society_core::{InviteRecord, Role};
use validator::Validate;

use crate::dto::{
    AcceptInviteRequest, AccountDto, AccountResponse, GenerateInviteRequest, InviteResponse,
    OtpSentResponse, RequestInviteOtpRequest,
};
use crate::error::ApiError;
use crate::extractors::CurrentSession;
use crate::handlers::auth::throttle_otp;
use crate::response::ApiResponse;
use crate::state::AppState;

/// POST /api/invites/request-invite-otp
pub async fn request_invite_otp(
    State(state): State<AppState>,
    Json(payload): Json<RequestInviteOtpRequest>,
) -> Result<Json<ApiResponse<OtpSentResponse>>, ApiError> {
    payload.validate()?;
    throttle_otp(&state, &payload.email)?;

    let email = state
        .registration
        .request_invite_otp(&payload.token, &payload.email)
        .await?;
    Ok(Json(ApiResponse::success(OtpSentResponse {
        email,
        message: "OTP sent to your email".to_string(),
    })))
}

/// POST /api/invites/generate (admin)
pub async fn generate(
    State(state): State<AppState>,
    session: CurrentSession,
    Json(payload): Json<GenerateInviteRequest>,
) -> Result<Json<ApiResponse<InviteResponse>>, ApiError> {
    let claims = session.require(&[Role::Admin])?;
    payload.validate()?;
    let property_id = claims.property()?;

    let issued = state
        .registration
        .issue_invite(
            &property_id,
            &claims.sub,
            &payload.email,
            payload.role,
            payload.unit.as_deref(),
        )
        .await?;

    Ok(Json(ApiResponse::success(InviteResponse {
        invite_link: issued.invite_link,
        token: issued.token,
        expires_in_minutes: issued.expires_in_minutes,
        invite: issued.record,
    })))
}

/// GET /api/invites (admin)
pub async fn list(
    State(state): State<AppState>,
    session: CurrentSession,
) -> Result<Json<ApiResponse<Vec<InviteRecord>>>, ApiError> {
    let claims = session.require(&[Role::Admin])?;
    let invites = state.invites.list(&claims.property()?).await?;
    Ok(Json(ApiResponse::success(invites)))
}

/// POST /api/invites/accept
pub async fn accept(
    State(state): State<AppState>,
    Json(payload): Json<AcceptInviteRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AccountResponse>>), ApiError> {
    payload.validate()?;

    let account = state
        .registration
        .complete_registration(InviteAcceptance {
            token: payload.token,
            email: payload.email,
            name: payload.name,
            password: payload.password,
            phone: payload.phone,
            otp: payload.otp,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(AccountResponse {
            user: AccountDto::from(&account),
        })),
    ))
}
