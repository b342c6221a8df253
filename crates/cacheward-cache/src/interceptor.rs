//! Cache-aside interception of async handlers.
//!
//! [`Interceptor::intercept`] resolves a cache key for a call, returns the
//! stored result on a hit, and otherwise runs the handler and writes its
//! result back with a TTL. The store is strictly best-effort:
//!
//! - no store configured: the handler runs uncached
//! - lookup fails because the store is down: the handler runs and write-back
//!   is skipped for this call
//! - lookup fails for another reason, or the stored payload is undecodable:
//!   treated as a miss, and write-back overwrites the entry
//! - write-back fails: logged, the computed result is still returned
//!
//! Handler errors are returned unchanged. Key derivation errors are always
//! surfaced, even when no store is configured.
//!
//! Concurrent misses on the same key may both run the handler; the last
//! write-back wins.
//!
//! # Example
//!
//! ```ignore
//! use cacheward_cache::{CacheOptions, Interceptor, MemoryStore, StoreHandle};
//!
//! let interceptor = Interceptor::new(StoreHandle::new(MemoryStore::new()), "main");
//! let get_user = interceptor.wrap(
//!     "get_user",
//!     CacheOptions::new().with_expire(300).with_namespace("users"),
//!     |lookup: UserLookup| async move { load_user(lookup.user_id).await },
//! )?;
//!
//! let user = get_user.call(UserLookup { user_id: 42 }).await?;
//! ```

use crate::metrics::{LookupOutcome, track_encoding_error, track_lookup, track_writeback};
use crate::store::{CacheStore, MAX_TTL, StoreHandle};
use cacheward_core::{ArgumentSet, CacheKey, ExclusionSet, KeyError, KeyStrategy};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// TTL used when neither options nor the interceptor specify one.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// Per-handler caching options.
#[derive(Debug, Clone, Default)]
pub struct CacheOptions {
    ttl: Option<Duration>,
    namespace: Option<String>,
    key: KeyStrategy,
}

impl CacheOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the TTL in whole seconds.
    ///
    /// A TTL of zero is raised to one second.
    pub fn with_expire(self, seconds: u64) -> Self {
        self.with_ttl(Duration::from_secs(seconds))
    }

    /// Sets the TTL. Sub-second remainders are dropped by Redis; a TTL below
    /// one second is raised to one second and one above [`MAX_TTL`] is capped.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        let ttl = if ttl < Duration::from_secs(1) {
            warn!(requested = ?ttl, "Cache TTL must be at least one second, using 1s");
            Duration::from_secs(1)
        } else if ttl > MAX_TTL {
            warn!(requested = ?ttl, max = ?MAX_TTL, "Cache TTL too long, capping");
            MAX_TTL
        } else {
            ttl
        };
        self.ttl = Some(ttl);
        self
    }

    /// Places keys under `namespace` instead of the default namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        self.namespace = (!namespace.is_empty()).then_some(namespace);
        self
    }

    /// Uses a literal local key, skipping fingerprinting.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = KeyStrategy::Static(key.into());
        self
    }

    /// Derives the local key with a custom builder.
    pub fn with_key_builder<F>(mut self, build: F) -> Self
    where
        F: Fn(&str, &ArgumentSet) -> Result<String, KeyError> + Send + Sync + 'static,
    {
        self.key = KeyStrategy::builder(build);
        self
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn key_strategy(&self) -> &KeyStrategy {
        &self.key
    }
}

enum Lookup<T> {
    Hit(T),
    Miss,
    Corrupt,
    StoreDown,
}

/// Cache-aside wrapper around handler invocations.
///
/// Cheap to clone; clones share the store handle and configuration.
#[derive(Clone)]
pub struct Interceptor {
    store: StoreHandle,
    default_namespace: Arc<str>,
    default_ttl: Duration,
    excluded: Arc<ExclusionSet>,
}

impl fmt::Debug for Interceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interceptor")
            .field("store", &self.store)
            .field("default_namespace", &self.default_namespace)
            .field("default_ttl", &self.default_ttl)
            .field("excluded", &self.excluded)
            .finish()
    }
}

impl Interceptor {
    pub fn new(store: StoreHandle, default_namespace: impl Into<String>) -> Self {
        Self {
            store,
            default_namespace: Arc::from(default_namespace.into()),
            default_ttl: DEFAULT_TTL,
            excluded: Arc::new(ExclusionSet::new()),
        }
    }

    /// Declares arguments that never take part in a fingerprint.
    pub fn with_exclusions(mut self, excluded: ExclusionSet) -> Self {
        self.excluded = Arc::new(excluded);
        self
    }

    /// TTL for handlers whose options do not set one.
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl.clamp(Duration::from_secs(1), MAX_TTL);
        self
    }

    pub fn store(&self) -> &StoreHandle {
        &self.store
    }

    pub fn default_namespace(&self) -> &str {
        &self.default_namespace
    }

    pub fn excluded(&self) -> &ExclusionSet {
        &self.excluded
    }

    /// Resolves the full cache key for a call.
    pub fn key_for(
        &self,
        identity: &str,
        args: &ArgumentSet,
        options: &CacheOptions,
    ) -> Result<CacheKey, KeyError> {
        let local = options.key.resolve(identity, args, &self.excluded)?;
        Ok(CacheKey::compose(
            options.namespace(),
            &self.default_namespace,
            &local,
        ))
    }

    /// Runs `handler` through the cache.
    ///
    /// `args` only feeds key derivation; the handler owns its real inputs.
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
        let key = self.key_for(identity, args, options)?;
        let namespace = key.namespace().to_string();

        let Some(store) = self.store.get() else {
            debug!(cache.key = %key, "Cache bypass (no store)");
            track_lookup(&namespace, LookupOutcome::Bypass);
            return handler().await;
        };

        let write_back = match self.lookup::<T>(store.as_ref(), &key).await {
            Lookup::Hit(value) => {
                track_lookup(&namespace, LookupOutcome::Hit);
                return Ok(value);
            }
            Lookup::Miss => {
                track_lookup(&namespace, LookupOutcome::Miss);
                true
            }
            Lookup::Corrupt => {
                track_lookup(&namespace, LookupOutcome::Corrupt);
                true
            }
            Lookup::StoreDown => {
                track_lookup(&namespace, LookupOutcome::StoreDown);
                false
            }
        };

        let value = handler().await?;

        if write_back {
            let ttl = options.ttl().unwrap_or(self.default_ttl);
            self.write_back(store.as_ref(), &key, &value, ttl).await;
        } else {
            debug!(cache.key = %key, "Skipping write-back, store is down");
            track_writeback(&namespace, "skipped");
        }

        Ok(value)
    }

    /// Wraps `handler` into a [`Cached`] value.
    ///
    /// Static keys are validated here rather than on first call.
    pub fn wrap<A, F, Fut>(
        &self,
        identity: impl Into<String>,
        options: CacheOptions,
        handler: F,
    ) -> Result<Cached<A, F>, KeyError>
    where
        F: Fn(A) -> Fut,
    {
        options.key.validate()?;

        Ok(Cached {
            interceptor: self.clone(),
            identity: identity.into(),
            options,
            handler,
            _args: PhantomData,
        })
    }

    async fn lookup<T: DeserializeOwned>(&self, store: &dyn CacheStore, key: &CacheKey) -> Lookup<T> {
        match store.get(key.as_str()).await {
            Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
                Ok(value) => {
                    debug!(cache.key = %key, "Cache hit");
                    Lookup::Hit(value)
                }
                Err(e) => {
                    error!(cache.key = %key, error = %e, "Failed to decode cached value");
                    Lookup::Corrupt
                }
            },
            Ok(None) => {
                debug!(cache.key = %key, "Cache miss");
                Lookup::Miss
            }
            Err(e) if e.is_unavailable() => {
                warn!(cache.key = %key, error = %e, "Cache store unavailable, running uncached");
                Lookup::StoreDown
            }
            Err(e) => {
                warn!(cache.key = %key, error = %e, "Cache GET failed");
                Lookup::Miss
            }
        }
    }

    async fn write_back<T: Serialize>(
        &self,
        store: &dyn CacheStore,
        key: &CacheKey,
        value: &T,
        ttl: Duration,
    ) {
        let namespace = key.namespace();

        let encoded = match serde_json::to_vec(value) {
            Ok(encoded) => encoded,
            Err(e) => {
                error!(cache.key = %key, error = %e, "Failed to serialize response for cache");
                track_encoding_error(namespace);
                track_writeback(namespace, "skipped");
                return;
            }
        };

        match store.set(key.as_str(), &encoded, ttl).await {
            Ok(()) => {
                debug!(cache.key = %key, cache.ttl_secs = ttl.as_secs(), "Cached");
                track_writeback(namespace, "ok");
            }
            Err(e) => {
                warn!(cache.key = %key, error = %e, "Cache SET failed");
                track_writeback(namespace, "error");
            }
        }
    }
}

/// Arguments of a wrapped handler, as seen by key derivation.
///
/// Implemented for every `Serialize` type: structs become named arguments,
/// tuples positional ones, and `()` an empty set.
pub trait CacheArguments {
    fn cache_arguments(&self) -> Result<ArgumentSet, KeyError>;
}

impl<T: Serialize + ?Sized> CacheArguments for T {
    fn cache_arguments(&self) -> Result<ArgumentSet, KeyError> {
        ArgumentSet::from_serialize(self)
    }
}

/// A handler composed with caching, produced by [`Interceptor::wrap`].
///
/// Calls keep the handler's signature: `call(args)` returns what the handler
/// returns.
pub struct Cached<A, F> {
    interceptor: Interceptor,
    identity: String,
    options: CacheOptions,
    handler: F,
    _args: PhantomData<fn(A)>,
}

impl<A, F> Cached<A, F> {
    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn options(&self) -> &CacheOptions {
        &self.options
    }

    /// Invokes the handler through the cache.
    pub async fn call<T, E, Fut>(&self, args: A) -> Result<T, E>
    where
        A: CacheArguments,
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        T: Serialize + DeserializeOwned,
        E: From<KeyError>,
    {
        let arguments = args.cache_arguments()?;
        self.interceptor
            .intercept(&self.identity, &arguments, &self.options, || {
                (self.handler)(args)
            })
            .await
    }
}

impl<A, F: Clone> Clone for Cached<A, F> {
    fn clone(&self) -> Self {
        Self {
            interceptor: self.interceptor.clone(),
            identity: self.identity.clone(),
            options: self.options.clone(),
            handler: self.handler.clone(),
            _args: PhantomData,
        }
    }
}

impl<A, F> fmt::Debug for Cached<A, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cached")
            .field("identity", &self.identity)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
