// ============================================================================
// Society Infrastructure - Redis OTP Store
// File: crates/society-infrastructure/src/cache/redis_otp_store.rs
// ============================================================================
//! Shared OTP store for multi-instance deployments.
//!
//! Entries are hashes under `otp:{email}:{purpose}` with `digest`,
//! `expires_at` (unix millis) and `attempts` fields. Redis expires keys a
//! grace period after the code itself expires, so the ledger can still report
//! `Expired` instead of `NotFound` for a late attempt.
//!
//! Verification attempts run as a Lua script so the count, comparison, and
//! removal happen in one server-side step.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deadpool_redis::redis::{self, AsyncCommands, Script};
use deadpool_redis::{Config, Connection, Pool, PoolConfig, Runtime};
use tracing::error;

use society_core::domain::{AttemptOutcome, OtpEntry};
use society_core::error::DomainError;
use society_core::repositories::OtpStore;

const KEY_PREFIX: &str = "otp";
const EXPIRY_GRACE_SECONDS: i64 = 60;

const FIELD_DIGEST: &str = "digest";
const FIELD_EXPIRES_AT: &str = "expires_at";
const FIELD_ATTEMPTS: &str = "attempts";

// Mirrors OtpEntry::attempt. Replies {outcome, attempts}.
const ATTEMPT_SCRIPT: &str = r#"
local fields = redis.call('HMGET', KEYS[1], 'digest', 'expires_at', 'attempts')
if not fields[1] then
  return {0, 0}
end
if tonumber(ARGV[2]) > tonumber(fields[2]) then
  redis.call('DEL', KEYS[1])
  return {1, 0}
end
local attempts = tonumber(fields[3])
if attempts >= tonumber(ARGV[3]) then
  redis.call('DEL', KEYS[1])
  return {2, attempts}
end
attempts = attempts + 1
if fields[1] == ARGV[1] then
  redis.call('DEL', KEYS[1])
  return {3, attempts}
end
redis.call('HSET', KEYS[1], 'attempts', attempts)
return {4, attempts}
"#;

pub fn create_redis_pool(url: &str, max_connections: u32) -> Result<Pool, deadpool_redis::CreatePoolError> {
    let mut cfg = Config::from_url(url);
    cfg.pool = Some(PoolConfig::new(max_connections as usize));
    cfg.create_pool(Some(Runtime::Tokio1))
}

pub struct RedisOtpStore {
    pool: Pool,
    attempt_script: Script,
}

impl RedisOtpStore {
    pub fn new(pool: Pool) -> Self {
        Self {
            pool,
            attempt_script: Script::new(ATTEMPT_SCRIPT),
        }
    }

    fn key(key: &str) -> String {
        format!("{}:{}", KEY_PREFIX, key)
    }

    async fn connection(&self) -> Result<Connection, DomainError> {
        self.pool.get().await.map_err(|e| {
            error!("Redis pool error: {}", e);
            DomainError::CacheError(e.to_string())
        })
    }
}

fn cache_error(context: &str, e: impl std::fmt::Display) -> DomainError {
    error!("Redis error {}: {}", context, e);
    DomainError::CacheError(e.to_string())
}

/// Key lifetime in seconds, measured from the caller's clock.
fn key_ttl(entry: &OtpEntry, now: DateTime<Utc>) -> u64 {
    ((entry.expires_at - now).num_seconds().max(0) + EXPIRY_GRACE_SECONDS) as u64
}

fn decode_entry(fields: &HashMap<String, String>) -> Result<Option<OtpEntry>, DomainError> {
    let Some(digest) = fields.get(FIELD_DIGEST) else {
        return Ok(None);
    };
    let expires_at = fields
        .get(FIELD_EXPIRES_AT)
        .and_then(|raw| raw.parse::<i64>().ok())
        .and_then(DateTime::from_timestamp_millis)
        .ok_or_else(|| cache_error("decoding OTP", "bad expires_at"))?;
    let attempt_count = fields
        .get(FIELD_ATTEMPTS)
        .and_then(|raw| raw.parse::<u32>().ok())
        .ok_or_else(|| cache_error("decoding OTP", "bad attempts"))?;

    Ok(Some(OtpEntry {
        code_digest: digest.clone(),
        expires_at,
        attempt_count,
    }))
}

fn decode_outcome(reply: &[i64]) -> Result<AttemptOutcome, DomainError> {
    let (code, attempts) = match reply {
        [code, attempts] => (*code, *attempts as u32),
        _ => return Err(cache_error("verifying OTP", "unexpected script reply")),
    };
    match code {
        0 => Ok(AttemptOutcome::Missing),
        1 => Ok(AttemptOutcome::Expired),
        2 => Ok(AttemptOutcome::Exhausted),
        3 => Ok(AttemptOutcome::Matched),
        4 => Ok(AttemptOutcome::Mismatched { attempts }),
        other => Err(cache_error("verifying OTP", format!("unknown outcome {}", other))),
    }
}

#[async_trait]
impl OtpStore for RedisOtpStore {
    async fn put(&self, key: &str, entry: OtpEntry, now: DateTime<Utc>) -> Result<(), DomainError> {
        let key = Self::key(key);
        let fields = [
            (FIELD_DIGEST, entry.code_digest.clone()),
            (FIELD_EXPIRES_AT, entry.expires_at.timestamp_millis().to_string()),
            (FIELD_ATTEMPTS, entry.attempt_count.to_string()),
        ];

        let mut conn = self.connection().await?;
        redis::pipe()
            .atomic()
            .del(&key)
            .ignore()
            .hset_multiple(&key, &fields[..])
            .ignore()
            .expire(&key, key_ttl(&entry, now) as i64)
            .ignore()
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| cache_error("storing OTP", e))
    }

    async fn get(&self, key: &str) -> Result<Option<OtpEntry>, DomainError> {
        let mut conn = self.connection().await?;
        let fields: HashMap<String, String> = conn
            .hgetall(Self::key(key))
            .await
            .map_err(|e| cache_error("reading OTP", e))?;
        decode_entry(&fields)
    }

    async fn remove(&self, key: &str) -> Result<(), DomainError> {
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(Self::key(key))
            .await
            .map_err(|e| cache_error("removing OTP", e))
    }

    async fn try_attempt(
        &self,
        key: &str,
        candidate_digest: &str,
        now: DateTime<Utc>,
        max_attempts: u32,
    ) -> Result<AttemptOutcome, DomainError> {
        let mut conn = self.connection().await?;
        let reply: Vec<i64> = self
            .attempt_script
            .key(Self::key(key))
            .arg(candidate_digest)
            .arg(now.timestamp_millis())
            .arg(max_attempts)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| cache_error("verifying OTP", e))?;
        decode_outcome(&reply)
    }

    /// Redis key expiry already handles cleanup.
    async fn remove_expired(&self, _now: DateTime<Utc>) -> Result<usize, DomainError> {
        Ok(0)
    }
}
