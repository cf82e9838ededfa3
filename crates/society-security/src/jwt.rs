//! Signed token handling
//!
//! Every token carries a `type` marker next to its `iat`/`exp`, so a token
//! minted for one purpose can never be accepted for another. Expiry is checked
//! against the injected clock rather than inside `jsonwebtoken`, which keeps the
//! boundary testable.

use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use society_shared::Clock;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JwtError {
    #[error("Token creation failed: {0}")]
    CreationError(String),
    #[error("Token signature is invalid")]
    BadSignature,
    #[error("Token expired")]
    TokenExpired,
    #[error("Token type mismatch: expected {expected}, found {found}")]
    WrongType { expected: String, found: String },
    #[error("Token is malformed: {0}")]
    Malformed(String),
}

/// Claims envelope shared by every token the service mints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedClaims<C> {
    #[serde(rename = "type")]
    pub token_type: String,
    pub iat: i64,
    pub exp: i64,
    #[serde(flatten)]
    pub claims: C,
}

pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    clock: Arc<dyn Clock>,
}

impl JwtService {
    pub fn new(secret: &str, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            clock,
        }
    }

    pub fn issue<C: Serialize>(
        &self,
        token_type: &str,
        claims: C,
        ttl: Duration,
    ) -> Result<String, JwtError> {
        let now = self.clock.now();
        let signed = SignedClaims {
            token_type: token_type.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            claims,
        };
        encode(&Header::new(Algorithm::HS256), &signed, &self.encoding_key)
            .map_err(|e| JwtError::CreationError(e.to_string()))
    }

    /// Verifies signature, then type marker, then expiry, in that order.
    pub fn verify<C: DeserializeOwned>(
        &self,
        token: &str,
        expected_type: &str,
    ) -> Result<SignedClaims<C>, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp"]);

        let raw = decode::<serde_json::Value>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => JwtError::BadSignature,
                _ => JwtError::Malformed(e.to_string()),
            })?;

        let found = raw
            .get("type")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        if found != expected_type {
            return Err(JwtError::WrongType {
                expected: expected_type.to_string(),
                found,
            });
        }

        let exp = raw
            .get("exp")
            .and_then(|v| v.as_i64())
            .ok_or_else(|| JwtError::Malformed("exp is not an integer".into()))?;
        if self.clock.now().timestamp() >= exp {
            return Err(JwtError::TokenExpired);
        }

        serde_json::from_value(raw).map_err(|e| JwtError::Malformed(e.to_string()))
    }
}
