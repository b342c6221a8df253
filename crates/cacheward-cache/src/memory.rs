//! Process-local store.
//!
//! Useful when running a single instance without Redis, and as the store of
//! choice in tests. Expiry uses `tokio::time::Instant`, so paused-clock tests
//! can advance past a TTL without sleeping.

use crate::store::{CacheStore, MAX_TTL, StoreError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct Entry {
    value: Vec<u8>,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// In-memory store with per-entry TTL.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|entry| entry.is_live(now))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Remaining lifetime of a live entry.
    pub async fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.expires_at - now)
    }

    async fn purge_expired(&self) {
        let now = Instant::now();
        self.entries.write().await.retain(|_, entry| entry.is_live(now));
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let now = Instant::now();
        let entries = self.entries.read().await;

        Ok(entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), StoreError> {
        let expires_at = Instant::now()
            .checked_add(ttl.min(MAX_TTL))
            .ok_or_else(|| StoreError::Command(format!("ttl {ttl:?} out of range")))?;
        let entry = Entry {
            value: value.to_vec(),
            expires_at,
        };
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<u64, StoreError> {
        let now = Instant::now();
        let removed = self.entries.write().await.remove(key);
        Ok(u64::from(removed.is_some_and(|entry| entry.is_live(now))))
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        self.purge_expired().await;

        let mut keys: Vec<String> = self
            .entries
            .read()
            .await
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort_unstable();

        Ok(keys)
    }

    async fn health_check(&self) -> bool {
        true
    }
}
