//! Invite token codec
//!
//! Self-contained bearer credential carrying invite intent. Nothing is
//! persisted; expiry is enforced at decode time.

use std::sync::Arc;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use society_security::JwtService;
use society_shared::constants::{DEFAULT_INVITE_TOKEN_EXPIRY, TOKEN_TYPE_INVITE};
use uuid::Uuid;

use crate::domain::InviteRole;
use crate::error::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteClaims {
    pub role: InviteRole,
    pub property_id: Uuid,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_unit: Option<String>,
}

pub struct InviteTokenCodec {
    jwt: Arc<JwtService>,
    ttl: Duration,
}

impl InviteTokenCodec {
    pub fn new(jwt: Arc<JwtService>, ttl: Duration) -> Self {
        Self { jwt, ttl }
    }

    pub fn with_default_ttl(jwt: Arc<JwtService>) -> Self {
        Self::new(jwt, Duration::seconds(DEFAULT_INVITE_TOKEN_EXPIRY))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn encode(&self, claims: &InviteClaims) -> Result<String, DomainError> {
        self.jwt
            .issue(TOKEN_TYPE_INVITE, claims, self.ttl)
            .map_err(|e| DomainError::TokenGenerationError(e.to_string()))
    }

    /// Fails with `InvalidToken` carrying the precise rejection: bad
    /// signature, expired, or not an invite token at all.
    pub fn decode(&self, token: &str) -> Result<InviteClaims, DomainError> {
        let signed = self.jwt.verify::<InviteClaims>(token.trim(), TOKEN_TYPE_INVITE)?;
        Ok(signed.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use society_security::JwtError;
    use society_shared::ManualClock;

    fn claims() -> InviteClaims {
        InviteClaims {
            role: InviteRole::Tenant,
            property_id: Uuid::new_v4(),
            email: "tenant@x.com".into(),
            target_unit: Some("B0101".into()),
        }
    }

    fn codec(clock: Arc<ManualClock>) -> (InviteTokenCodec, Arc<JwtService>) {
        let jwt = Arc::new(JwtService::new("invite-secret", clock));
        (InviteTokenCodec::with_default_ttl(jwt.clone()), jwt)
    }

    #[test]
    fn test_round_trip_keeps_claims() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let (codec, _) = codec(clock);
        let token = codec.encode(&claims()).unwrap();
        let decoded = codec.decode(&token).unwrap();
        assert_eq!(decoded.email, "tenant@x.com");
        assert_eq!(decoded.target_unit.as_deref(), Some("B0101"));
    }

    #[test]
    fn test_expiry_boundary() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let (codec, _) = codec(clock.clone());
        let token = codec.encode(&claims()).unwrap();

        clock.advance(Duration::minutes(14) + Duration::seconds(59));
        assert!(codec.decode(&token).is_ok());

        clock.advance(Duration::seconds(2));
        assert!(matches!(
            codec.decode(&token),
            Err(DomainError::InvalidToken(JwtError::TokenExpired))
        ));
    }

    #[test]
    fn test_session_token_is_wrong_type() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let (codec, jwt) = codec(clock);
        let session = jwt
            .issue("access", claims(), Duration::minutes(5))
            .unwrap();
        assert!(matches!(
            codec.decode(&session),
            Err(DomainError::InvalidToken(JwtError::WrongType { .. }))
        ));
    }

    #[test]
    fn test_tampered_token_is_bad_signature() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let (codec, _) = codec(clock.clone());
        let foreign = InviteTokenCodec::with_default_ttl(Arc::new(JwtService::new("other", clock)));
        let token = foreign.encode(&claims()).unwrap();
        assert!(matches!(
            codec.decode(&token),
            Err(DomainError::InvalidToken(JwtError::BadSignature))
        ));
    }
}
