//! Cache invalidation.
//!
//! [`Invalidator::clear`] deletes immediately; there is no soft delete.
//!
//! | `key`   | `namespace` | deletes                                 |
//! |---------|-------------|-----------------------------------------|
//! | `None`  | `None`      | every key in the managed key space      |
//! | `None`  | `Some(ns)`  | every key starting with `ns:`           |
//! | `Some`  | `None`      | `<default namespace>:key`               |
//! | `Some`  | `Some(ns)`  | `ns:key`                                |
//!
//! Empty strings count as absent. Without a store, or when the store fails,
//! nothing is deleted and zero is reported.

use crate::metrics::track_invalidation;
use crate::store::{CacheStore, StoreHandle};
use cacheward_core::{CacheKey, namespace_prefix};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Deletes cache entries by key, namespace or wholesale.
#[derive(Debug, Clone)]
pub struct Invalidator {
    store: StoreHandle,
    default_namespace: Arc<str>,
}

impl Invalidator {
    pub fn new(store: StoreHandle, default_namespace: impl Into<String>) -> Self {
        Self {
            store,
            default_namespace: Arc::from(default_namespace.into()),
        }
    }

    /// Clears cache entries and returns how many keys were deleted.
    pub async fn clear(&self, key: Option<&str>, namespace: Option<&str>) -> u64 {
        let key = key.filter(|k| !k.is_empty());
        let namespace = namespace.filter(|ns| !ns.is_empty());

        let Some(store) = self.store.get() else {
            debug!(?key, ?namespace, "Cache clear skipped (no store)");
            return 0;
        };
        let store = store.as_ref();

        match (key, namespace) {
            (Some(key), namespace) => {
                let key = CacheKey::compose(namespace, &self.default_namespace, key);
                self.delete_key(store, &key).await
            }
            (None, Some(namespace)) => {
                self.delete_prefix(store, &namespace_prefix(namespace), "namespace")
                    .await
            }
            (None, None) => self.delete_prefix(store, "", "all").await,
        }
    }

    /// Deletes one key in the default namespace, or in `namespace` if given.
    pub async fn clear_key(&self, key: &str, namespace: Option<&str>) -> u64 {
        self.clear(Some(key), namespace).await
    }

    /// Deletes every key under `namespace`.
    pub async fn clear_namespace(&self, namespace: &str) -> u64 {
        self.clear(None, Some(namespace)).await
    }

    /// Deletes every key in the managed key space.
    pub async fn clear_all(&self) -> u64 {
        self.clear(None, None).await
    }

    async fn delete_key(&self, store: &dyn CacheStore, key: &CacheKey) -> u64 {
        match store.delete(key.as_str()).await {
            Ok(deleted) => {
                debug!(cache.key = %key, cache.deleted = deleted, "Cache key invalidated");
                track_invalidation("key", deleted);
                deleted
            }
            Err(e) => {
                warn!(cache.key = %key, error = %e, "Failed to invalidate cache key");
                0
            }
        }
    }

    async fn delete_prefix(&self, store: &dyn CacheStore, prefix: &str, scope: &'static str) -> u64 {
        let keys = match store.scan_prefix(prefix).await {
            Ok(keys) => keys,
            Err(e) => {
                warn!(cache.prefix = %prefix, error = %e, "Failed to scan cache keys");
                return 0;
            }
        };

        if keys.is_empty() {
            debug!(cache.prefix = %prefix, "No cache keys to invalidate");
            return 0;
        }

        match store.delete_many(&keys).await {
            Ok(deleted) => {
                info!(cache.prefix = %prefix, cache.deleted = deleted, scope, "Cache invalidated");
                track_invalidation(scope, deleted);
                deleted
            }
            Err(e) => {
                warn!(cache.prefix = %prefix, error = %e, "Failed to invalidate cache keys");
                0
            }
        }
    }
}
