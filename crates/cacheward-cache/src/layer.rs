//! The composed cache layer handed to application code.

use crate::init::initialize;
use crate::interceptor::{CacheOptions, Cached, Interceptor};
use crate::invalidation::Invalidator;
use crate::store::StoreHandle;
use cacheward_config::CacheConfig;
use cacheward_core::{ArgumentSet, ExclusionSet, KeyError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;

/// Interceptor and invalidator sharing one store handle.
#[derive(Debug, Clone)]
pub struct Cache {
    interceptor: Interceptor,
    invalidator: Invalidator,
}

impl Cache {
    /// Builds the layer around an already initialized store handle.
    pub fn new(store: StoreHandle, config: &CacheConfig) -> Self {
        let excluded: ExclusionSet = config.excluded_arguments.iter().cloned().collect();

        Self {
            interceptor: Interceptor::new(store.clone(), config.namespace.clone())
                .with_exclusions(excluded)
                .with_default_ttl(config.default_ttl()),
            invalidator: Invalidator::new(store, config.namespace.clone()),
        }
    }

    /// Connects to the configured store and builds the layer.
    pub async fn from_config(config: &CacheConfig) -> Self {
        let store = initialize(config).await;
        Self::new(store, config)
    }

    /// A layer that never caches.
    pub fn disabled(config: &CacheConfig) -> Self {
        Self::new(StoreHandle::none(), config)
    }

    /// Whether a store is attached.
    pub fn is_enabled(&self) -> bool {
        self.interceptor.store().is_set()
    }

    pub fn interceptor(&self) -> &Interceptor {
        &self.interceptor
    }

    pub fn invalidator(&self) -> &Invalidator {
        &self.invalidator
    }

    /// See [`Interceptor::wrap`].
    pub fn cached<A, F, Fut>(
        &self,
        identity: impl Into<String>,
        options: CacheOptions,
        handler: F,
    ) -> Result<Cached<A, F>, KeyError>
    where
        F: Fn(A) -> Fut,
    {
        self.interceptor.wrap(identity, options, handler)
    }

    /// See [`Interceptor::intercept`].
    pub async fn intercept<T, E, F, Fut>(
        &self,
        identity: &str,
        args: &ArgumentSet,
        options: &CacheOptions,
        handler: F,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        T: Serialize + DeserializeOwned,
        E: From<KeyError>,
    {
        self.interceptor
            .intercept(identity, args, options, handler)
            .await
    }

    /// See [`Invalidator::clear`].
    pub async fn clear(&self, key: Option<&str>, namespace: Option<&str>) -> u64 {
        self.invalidator.clear(key, namespace).await
    }

    /// Whether the attached store is reachable. `false` without a store.
    pub async fn health_check(&self) -> bool {
        match self.interceptor.store().get() {
            Some(store) => store.health_check().await,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use serde::Deserialize;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Serialize, Deserialize)]
    struct Query {
        user_id: i64,
        trace_id: String,
    }

    #[tokio::test]
    async fn test_configured_exclusions_apply() {
        let config = CacheConfig {
            excluded_arguments: vec!["trace_id".into()],
            ..CacheConfig::default()
        };
        let cache = Cache::new(StoreHandle::new(MemoryStore::new()), &config);
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = calls.clone();
        let handler = cache
            .cached("lookup", CacheOptions::new(), move |q: Query| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, KeyError>(q.user_id)
                }
            })
            .unwrap();

        for trace_id in ["t1", "t2", "t3"] {
            let value = handler
                .call(Query {
                    user_id: 1,
                    trace_id: trace_id.into(),
                })
                .await
                .unwrap();
            assert_eq!(value, 1);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_clear_then_miss() {
        let store = Arc::new(MemoryStore::new());
        let cache = Cache::new(StoreHandle::from(store.clone()), &CacheConfig::default());
        let calls = AtomicUsize::new(0);
        let args = ArgumentSet::new().param("user_id", &42);
        let options = CacheOptions::new().with_namespace("users");

        let counter = &calls;
        let run = move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, KeyError>(42)
        };

        cache.intercept("get_user", &args, &options, run).await.unwrap();
        cache.intercept("get_user", &args, &options, run).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert_eq!(cache.clear(None, None).await, 1);
        cache.intercept("get_user", &args, &options, run).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_disabled_layer() {
        let cache = Cache::disabled(&CacheConfig::default());
        assert!(!cache.is_enabled());
        assert!(!cache.health_check().await);
        assert_eq!(cache.clear(None, None).await, 0);
    }
}
