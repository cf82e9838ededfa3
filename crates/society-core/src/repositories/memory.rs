//! In-memory adapters
//!
//! Process-local implementations of the ports, backed by `DashMap`. Used for
//! single-instance deployments of the OTP store, for local development, and by
//! the test suites.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use crate::domain::{Account, AttemptOutcome, OtpEntry, Property, Role};
use crate::error::DomainError;
use crate::repositories::{AccountRepository, OtpStore, PropertyRepository};

/// Thread-safe keyed OTP storage.
#[derive(Clone, Default)]
pub struct InMemoryOtpStore {
    entries: Arc<DashMap<String, OtpEntry>>,
}

impl InMemoryOtpStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl OtpStore for InMemoryOtpStore {
    async fn put(&self, key: &str, entry: OtpEntry, _now: DateTime<Utc>) -> Result<(), DomainError> {
        self.entries.insert(key.to_string(), entry);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<OtpEntry>, DomainError> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn remove(&self, key: &str) -> Result<(), DomainError> {
        self.entries.remove(key);
        Ok(())
    }

    async fn try_attempt(
        &self,
        key: &str,
        candidate_digest: &str,
        now: DateTime<Utc>,
        max_attempts: u32,
    ) -> Result<AttemptOutcome, DomainError> {
        // The shard lock is held across read, count, and removal.
        match self.entries.entry(key.to_string()) {
            Entry::Vacant(_) => Ok(AttemptOutcome::Missing),
            Entry::Occupied(mut slot) => {
                let outcome = slot.get_mut().attempt(candidate_digest, now, max_attempts);
                if outcome.is_terminal() {
                    slot.remove();
                }
                Ok(outcome)
            }
        }
    }

    async fn remove_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError> {
        let start_len = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        let removed = start_len.saturating_sub(self.entries.len());
        debug!("Removed {} expired OTP entries", removed);
        Ok(removed)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryAccountRepository {
    accounts: Arc<DashMap<Uuid, Account>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Account>, DomainError> {
        Ok(self.accounts.get(id).map(|a| a.value().clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DomainError> {
        let email = email.to_lowercase();
        Ok(self
            .accounts
            .iter()
            .find(|a| a.value().email == email)
            .map(|a| a.value().clone()))
    }

    async fn list_by_property(&self, property_id: &Uuid, role: Option<Role>) -> Result<Vec<Account>, DomainError> {
        let mut accounts: Vec<Account> = self
            .accounts
            .iter()
            .filter(|a| a.value().property_id.as_ref() == Some(property_id))
            .filter(|a| role.map_or(true, |r| a.value().role == r))
            .map(|a| a.value().clone())
            .collect();
        accounts.sort_by_key(|a| a.created_at);
        Ok(accounts)
    }

    async fn create(&self, account: &Account) -> Result<Account, DomainError> {
        // Check-then-insert, not atomic. The Postgres adapter relies on a unique index.
        if self.find_by_email(&account.email).await?.is_some() {
            return Err(DomainError::AccountExists(account.email.clone()));
        }
        self.accounts.insert(account.id, account.clone());
        Ok(account.clone())
    }

    async fn update(&self, account: &Account) -> Result<Account, DomainError> {
        match self.accounts.get_mut(&account.id) {
            Some(mut stored) => {
                *stored = account.clone();
                Ok(account.clone())
            }
            None => Err(DomainError::AccountNotFound),
        }
    }

    async fn delete(&self, id: &Uuid) -> Result<(), DomainError> {
        self.accounts.remove(id);
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryPropertyRepository {
    properties: Arc<DashMap<Uuid, Property>>,
}

impl InMemoryPropertyRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PropertyRepository for InMemoryPropertyRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Property>, DomainError> {
        Ok(self.properties.get(id).map(|p| p.value().clone()))
    }

    async fn find_by_admin(&self, admin_id: &Uuid) -> Result<Option<Property>, DomainError> {
        Ok(self
            .properties
            .iter()
            .find(|p| p.value().admin_id == *admin_id)
            .map(|p| p.value().clone()))
    }

    async fn create(&self, property: &Property) -> Result<Property, DomainError> {
        self.properties.insert(property.id, property.clone());
        Ok(property.clone())
    }

    async fn update(&self, property: &Property) -> Result<Property, DomainError> {
        let mut stored = self
            .properties
            .get_mut(&property.id)
            .ok_or(DomainError::PropertyNotFound)?;
        if stored.version != property.version {
            return Err(DomainError::ConcurrentModification);
        }
        let mut next = property.clone();
        next.version += 1;
        *stored = next.clone();
        Ok(next)
    }
}
