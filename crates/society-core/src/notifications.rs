//! Outbound email port

use async_trait::async_trait;

use crate::domain::{InviteRole, OtpPurpose};
use crate::error::DomainError;

/// Invitation email contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteMessage {
    pub invite_link: String,
    pub role: InviteRole,
    pub property_name: String,
    pub expires_in_minutes: i64,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_otp(&self, to: &str, code: &str, purpose: OtpPurpose) -> Result<(), DomainError>;
    async fn send_invite(&self, to: &str, message: &InviteMessage) -> Result<(), DomainError>;
}
