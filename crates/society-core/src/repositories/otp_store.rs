//! OTP entry store trait (port)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crate::domain::{AttemptOutcome, OtpEntry};
use crate::error::DomainError;

/// Keyed storage for live codes. Writes are last-writer-wins per key.
#[async_trait]
pub trait OtpStore: Send + Sync {
    /// Stores `entry`, replacing any live one. `now` comes from the caller's clock.
    async fn put(&self, key: &str, entry: OtpEntry, now: DateTime<Utc>) -> Result<(), DomainError>;
    async fn get(&self, key: &str) -> Result<Option<OtpEntry>, DomainError>;
    async fn remove(&self, key: &str) -> Result<(), DomainError>;

    /// Runs [`OtpEntry::attempt`] as one atomic step on the stored entry and
    /// drops it on a terminal outcome. Concurrent attempts on the same key
    /// must each observe the count left by the previous one.
    async fn try_attempt(
        &self,
        key: &str,
        candidate_digest: &str,
        now: DateTime<Utc>,
        max_attempts: u32,
    ) -> Result<AttemptOutcome, DomainError>;

    /// Drops entries expired at `now`; returns how many were removed.
    async fn remove_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError>;
}
