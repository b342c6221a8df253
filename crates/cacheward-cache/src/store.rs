//! Backing store abstraction.
//!
//! The cache layer only needs a handful of key-value operations from its
//! store. Keys passed to a [`CacheStore`] are logical cache keys
//! (`namespace:local`); mapping them into a physical key space is the
//! store's business.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Longest TTL handed to a store. Redis rejects `SET EX` values whose expiry
/// overflows its millisecond clock, and `Instant` arithmetic panics on
/// overflow, so longer TTLs are capped here.
pub const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Error type for store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Connection refused or dropped, I/O failure, or timeout.
    #[error("cache store unavailable: {0}")]
    Unavailable(String),

    /// The store answered, but rejected the command.
    #[error("cache store command failed: {0}")]
    Command(String),
}

impl StoreError {
    /// Whether the error means the store is down rather than misbehaving.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Key-value store backing the cache.
#[async_trait]
pub trait CacheStore: Send + Sync + fmt::Debug {
    /// Reads a value. `Ok(None)` is a miss.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Writes a value that expires after `ttl`.
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), StoreError>;

    /// Deletes a key, returning how many keys were removed (0 or 1).
    async fn delete(&self, key: &str) -> Result<u64, StoreError>;

    /// Deletes several keys, returning how many were removed.
    async fn delete_many(&self, keys: &[String]) -> Result<u64, StoreError> {
        let mut deleted = 0;
        for key in keys {
            deleted += self.delete(key).await?;
        }
        Ok(deleted)
    }

    /// Lists every live key starting with `prefix`. An empty prefix lists the
    /// whole managed key space.
    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError>;

    /// Whether the store is reachable and round-trips a value.
    async fn health_check(&self) -> bool;
}

/// Shared reference to the backing store, or its explicit absence.
///
/// An empty handle is a valid state: the cache layer then runs every handler
/// uncached and invalidation is a no-op.
#[derive(Clone, Default)]
pub struct StoreHandle(Option<Arc<dyn CacheStore>>);

impl StoreHandle {
    /// A handle with no store behind it.
    pub fn none() -> Self {
        Self(None)
    }

    pub fn new<S: CacheStore + 'static>(store: S) -> Self {
        Self(Some(Arc::new(store)))
    }

    pub fn from_arc(store: Arc<dyn CacheStore>) -> Self {
        Self(Some(store))
    }

    pub fn get(&self) -> Option<&Arc<dyn CacheStore>> {
        self.0.as_ref()
    }

    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }
}

impl fmt::Debug for StoreHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(store) => f.debug_tuple("StoreHandle").field(store).finish(),
            None => f.write_str("StoreHandle(None)"),
        }
    }
}

impl<S: CacheStore + 'static> From<Arc<S>> for StoreHandle {
    fn from(store: Arc<S>) -> Self {
        Self(Some(store))
    }
}
