//! One-time code entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a code proves control of the email for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OtpPurpose {
    AdminRegistration,
    InviteRegistration,
}

impl OtpPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            OtpPurpose::AdminRegistration => "admin-registration",
            OtpPurpose::InviteRegistration => "invite-registration",
        }
    }

    /// Store key: `email:purpose`.
    pub fn key_for(&self, email: &str) -> String {
        format!("{}:{}", email, self.as_str())
    }
}

/// Live code for one `(email, purpose)` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpEntry {
    pub code_digest: String,
    pub expires_at: DateTime<Utc>,
    pub attempt_count: u32,
}

impl OtpEntry {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Applies one verification attempt in place.
    ///
    /// Expiry wins over the attempt cap, and the cap is checked before this
    /// attempt counts. Stores must drop the entry on a terminal outcome.
    pub fn attempt(&mut self, candidate_digest: &str, now: DateTime<Utc>, max_attempts: u32) -> AttemptOutcome {
        if self.is_expired(now) {
            return AttemptOutcome::Expired;
        }
        if self.attempt_count >= max_attempts {
            return AttemptOutcome::Exhausted;
        }
        self.attempt_count += 1;
        if self.code_digest == candidate_digest {
            AttemptOutcome::Matched
        } else {
            AttemptOutcome::Mismatched {
                attempts: self.attempt_count,
            }
        }
    }
}

/// Result of one atomic verification attempt against a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Missing,
    Expired,
    Exhausted,
    Matched,
    Mismatched { attempts: u32 },
}

impl AttemptOutcome {
    /// Whether the entry is gone after this attempt.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AttemptOutcome::Mismatched { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn entry(now: DateTime<Utc>) -> OtpEntry {
        OtpEntry {
            code_digest: "good".into(),
            expires_at: now + Duration::seconds(60),
            attempt_count: 0,
        }
    }

    #[test]
    fn test_attempt_counts_before_comparing() {
        let now = Utc::now();
        let mut otp = entry(now);
        assert_eq!(otp.attempt("bad", now, 3), AttemptOutcome::Mismatched { attempts: 1 });
        assert_eq!(otp.attempt("bad", now, 3), AttemptOutcome::Mismatched { attempts: 2 });
        assert_eq!(otp.attempt("good", now, 3), AttemptOutcome::Matched);
        assert_eq!(otp.attempt_count, 3);
        assert_eq!(otp.attempt("good", now, 3), AttemptOutcome::Exhausted);
    }

    #[test]
    fn test_expiry_checked_first() {
        let now = Utc::now();
        let mut otp = entry(now);
        otp.attempt_count = 3;
        assert_eq!(otp.attempt("good", now + Duration::seconds(61), 3), AttemptOutcome::Expired);
        assert!(AttemptOutcome::Expired.is_terminal());
        assert!(!AttemptOutcome::Mismatched { attempts: 1 }.is_terminal());
    }
}
