//! Bearer session extraction

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use society_core::services::SessionClaims;
use society_core::Role;

use crate::error::ApiError;
use crate::state::AppState;

/// Verified session claims from `Authorization: Bearer <token>`.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub SessionClaims);

impl CurrentSession {
    pub fn require(self, allowed: &[Role]) -> Result<SessionClaims, ApiError> {
        self.0.require_role(allowed)?;
        Ok(self.0)
    }
}

impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(ApiError::Unauthorized)?;

        let claims = state
            .auth
            .authenticate(token)
            .map_err(|_| ApiError::Unauthorized)?;
        Ok(CurrentSession(claims))
    }
}
