// ============================================================================
// Society Core - OTP Ledger
// File: crates/society-core/src/services/otp_ledger.rs
// ============================================================================
//! Short-lived one-time codes keyed by `(email, purpose)`.
//!
//! Expiry is checked lazily on every read; the periodic sweep is cleanup only.

use std::sync::Arc;

use chrono::Duration;
use society_security::otp::{digest_code, generate_code};
use society_shared::constants::{DEFAULT_OTP_MAX_ATTEMPTS, DEFAULT_OTP_TTL_SECONDS};
use society_shared::utils::mask_email;
use society_shared::Clock;
use tracing::{debug, info, warn};

use crate::domain::{AttemptOutcome, OtpEntry, OtpPurpose};
use crate::error::{DomainError, OtpFailure};
use crate::repositories::OtpStore;

#[derive(Debug, Clone, Copy)]
pub struct OtpPolicy {
    pub ttl: Duration,
    pub max_attempts: u32,
}

impl Default for OtpPolicy {
    fn default() -> Self {
        Self {
            ttl: Duration::seconds(DEFAULT_OTP_TTL_SECONDS),
            max_attempts: DEFAULT_OTP_MAX_ATTEMPTS,
        }
    }
}

/// Successful verification marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verified;

pub struct OtpLedger {
    store: Arc<dyn OtpStore>,
    clock: Arc<dyn Clock>,
    policy: OtpPolicy,
}

impl OtpLedger {
    pub fn new(store: Arc<dyn OtpStore>, clock: Arc<dyn Clock>, policy: OtpPolicy) -> Self {
        Self { store, clock, policy }
    }

    /// Mints a fresh code, replacing any live one for the same key.
    pub async fn issue(&self, email: &str, purpose: OtpPurpose) -> Result<String, DomainError> {
        let code = generate_code();
        let now = self.clock.now();
        let entry = OtpEntry {
            code_digest: digest_code(&code),
            expires_at: now + self.policy.ttl,
            attempt_count: 0,
        };
        self.store.put(&purpose.key_for(email), entry, now).await?;
        info!("Issued {} OTP for {}", purpose.as_str(), mask_email(email));
        Ok(code)
    }

    /// Drops the live code for a key, e.g. when delivery failed.
    pub async fn revoke(&self, email: &str, purpose: OtpPurpose) -> Result<(), DomainError> {
        self.store.remove(&purpose.key_for(email)).await
    }

    /// Checks a candidate code. The attempt is counted atomically by the store,
    /// so parallel guesses cannot share one attempt budget.
    pub async fn verify(
        &self,
        email: &str,
        purpose: OtpPurpose,
        candidate: &str,
    ) -> Result<Verified, DomainError> {
        let outcome = self
            .store
            .try_attempt(
                &purpose.key_for(email),
                &digest_code(candidate),
                self.clock.now(),
                self.policy.max_attempts,
            )
            .await?;

        match outcome {
            AttemptOutcome::Missing => Err(OtpFailure::NotFound.into()),
            AttemptOutcome::Expired => {
                debug!("OTP for {} expired", mask_email(email));
                Err(OtpFailure::Expired.into())
            }
            AttemptOutcome::Exhausted => {
                warn!("OTP for {} locked after too many attempts", mask_email(email));
                Err(OtpFailure::TooManyAttempts.into())
            }
            AttemptOutcome::Matched => {
                info!("Verified {} OTP for {}", purpose.as_str(), mask_email(email));
                Ok(Verified)
            }
            AttemptOutcome::Mismatched { attempts } => {
                warn!("OTP mismatch for {} (attempt {})", mask_email(email), attempts);
                Err(OtpFailure::Mismatch.into())
            }
        }
    }

    /// Advisory cleanup of expired entries.
    pub async fn sweep(&self) -> Result<usize, DomainError> {
        let removed = self.store.remove_expired(self.clock.now()).await?;
        if removed > 0 {
            info!("Cleaned up {} expired OTPs", removed);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::InMemoryOtpStore;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use society_shared::ManualClock;

    const EMAIL: &str = "tenant@x.com";
    const PURPOSE: OtpPurpose = OtpPurpose::InviteRegistration;

    fn ledger() -> (OtpLedger, Arc<ManualClock>, InMemoryOtpStore) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let store = InMemoryOtpStore::new();
        let ledger = OtpLedger::new(Arc::new(store.clone()), clock.clone(), OtpPolicy::default());
        (ledger, clock, store)
    }

    fn wrong(code: &str) -> String {
        if code == "111111" { "222222".into() } else { "111111".into() }
    }

    fn failure(result: Result<Verified, DomainError>) -> OtpFailure {
        match result {
            Err(DomainError::Otp(failure)) => failure,
            other => panic!("expected OTP failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_code_is_single_use() {
        let (ledger, _, _) = ledger();
        let code = ledger.issue(EMAIL, PURPOSE).await.unwrap();

        assert_eq!(ledger.verify(EMAIL, PURPOSE, &code).await.unwrap(), Verified);
        assert_eq!(failure(ledger.verify(EMAIL, PURPOSE, &code).await), OtpFailure::NotFound);
    }

    #[tokio::test]
    async fn test_fourth_attempt_is_locked_out() {
        let (ledger, _, store) = ledger();
        let code = ledger.issue(EMAIL, PURPOSE).await.unwrap();
        let bad = wrong(&code);

        for _ in 0..3 {
            assert_eq!(failure(ledger.verify(EMAIL, PURPOSE, &bad).await), OtpFailure::Mismatch);
        }
        assert_eq!(
            failure(ledger.verify(EMAIL, PURPOSE, &code).await),
            OtpFailure::TooManyAttempts
        );
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_correct_code_on_third_attempt_succeeds() {
        let (ledger, _, _) = ledger();
        let code = ledger.issue(EMAIL, PURPOSE).await.unwrap();
        let bad = wrong(&code);

        ledger.verify(EMAIL, PURPOSE, &bad).await.unwrap_err();
        ledger.verify(EMAIL, PURPOSE, &bad).await.unwrap_err();
        assert!(ledger.verify(EMAIL, PURPOSE, &code).await.is_ok());
    }

    #[tokio::test]
    async fn test_expired_code_rejected_and_removed() {
        let (ledger, clock, store) = ledger();
        let code = ledger.issue(EMAIL, PURPOSE).await.unwrap();

        clock.advance(Duration::seconds(61));
        assert_eq!(failure(ledger.verify(EMAIL, PURPOSE, &code).await), OtpFailure::Expired);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_code_valid_until_window_closes() {
        let (ledger, clock, _) = ledger();
        let code = ledger.issue(EMAIL, PURPOSE).await.unwrap();

        clock.advance(Duration::seconds(59));
        assert!(ledger.verify(EMAIL, PURPOSE, &code).await.is_ok());
    }

    #[tokio::test]
    async fn test_reissue_overwrites_previous_code() {
        let (ledger, _, store) = ledger();
        let first = ledger.issue(EMAIL, PURPOSE).await.unwrap();
        let bad = wrong(&first);
        ledger.verify(EMAIL, PURPOSE, &bad).await.unwrap_err();

        let second = ledger.issue(EMAIL, PURPOSE).await.unwrap();
        assert_eq!(store.len(), 1);
        let entry = store.get(&PURPOSE.key_for(EMAIL)).await.unwrap().unwrap();
        assert_eq!(entry.attempt_count, 0);
        assert!(ledger.verify(EMAIL, PURPOSE, &second).await.is_ok());
    }

    #[tokio::test]
    async fn test_purposes_are_isolated() {
        let (ledger, _, _) = ledger();
        let code = ledger.issue(EMAIL, OtpPurpose::AdminRegistration).await.unwrap();
        assert_eq!(failure(ledger.verify(EMAIL, PURPOSE, &code).await), OtpFailure::NotFound);
        assert!(ledger.verify(EMAIL, OtpPurpose::AdminRegistration, &code).await.is_ok());
    }

    #[tokio::test]
    async fn test_sweep_removes_only_expired() {
        let (ledger, clock, store) = ledger();
        ledger.issue("old@x.com", PURPOSE).await.unwrap();
        clock.advance(Duration::seconds(45));
        ledger.issue("new@x.com", PURPOSE).await.unwrap();
        clock.advance(Duration::seconds(30));

        assert_eq!(ledger.sweep().await.unwrap(), 1);
        assert_eq!(store.len(), 1);
    }

    /// Store that suspends before every call, like a networked cache would.
    struct YieldingStore(InMemoryOtpStore);

    #[async_trait]
    impl OtpStore for YieldingStore {
        async fn put(&self, key: &str, entry: OtpEntry, now: DateTime<Utc>) -> Result<(), DomainError> {
            tokio::task::yield_now().await;
            self.0.put(key, entry, now).await
        }

        async fn get(&self, key: &str) -> Result<Option<OtpEntry>, DomainError> {
            tokio::task::yield_now().await;
            self.0.get(key).await
        }

        async fn remove(&self, key: &str) -> Result<(), DomainError> {
            tokio::task::yield_now().await;
            self.0.remove(key).await
        }

        async fn try_attempt(
            &self,
            key: &str,
            candidate_digest: &str,
            now: DateTime<Utc>,
            max_attempts: u32,
        ) -> Result<AttemptOutcome, DomainError> {
            tokio::task::yield_now().await;
            self.0.try_attempt(key, candidate_digest, now, max_attempts).await
        }

        async fn remove_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError> {
            tokio::task::yield_now().await;
            self.0.remove_expired(now).await
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallel_guesses_share_one_attempt_budget() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let ledger = Arc::new(OtpLedger::new(
            Arc::new(YieldingStore(InMemoryOtpStore::new())),
            clock,
            OtpPolicy::default(),
        ));
        let code = ledger.issue(EMAIL, PURPOSE).await.unwrap();
        let bad = wrong(&code);

        let mut handles = Vec::new();
        for i in 0..51 {
            let ledger = ledger.clone();
            let candidate = if i == 25 { code.clone() } else { bad.clone() };
            handles.push(tokio::spawn(async move {
                ledger.verify(EMAIL, PURPOSE, &candidate).await
            }));
        }

        let mut evaluated = 0;
        let mut verified = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(Verified) => {
                    evaluated += 1;
                    verified += 1;
                }
                Err(DomainError::Otp(OtpFailure::Mismatch)) => evaluated += 1,
                Err(DomainError::Otp(_)) => {}
                Err(other) => panic!("unexpected error: {:?}", other),
            }
        }
        assert!(evaluated <= 3, "{} guesses were compared", evaluated);
        assert!(verified <= 1);
    }
}
