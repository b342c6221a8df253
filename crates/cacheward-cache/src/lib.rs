//! # Cacheward Cache
//!
//! Cache-aside caching for async handlers, backed by Redis.
//!
//! This crate provides:
//! - A store abstraction with Redis and in-memory implementations
//! - Store initialization with a health check and fail-open fallback
//! - The cache-aside interceptor (lookup, fallback on miss, write-back)
//! - Invalidation by key, namespace, or the whole managed key space
//! - Cache hit/miss/write-back counters
//!
//! # Example
//!
//! ```ignore
//! use cacheward_cache::{Cache, CacheOptions};
//! use cacheward_config::CacheConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = CacheConfig::from_env();
//!     let cache = Cache::from_config(&config).await;
//!
//!     let get_user = cache.cached(
//!         "get_user",
//!         CacheOptions::new().with_expire(300).with_namespace("users"),
//!         |lookup: UserLookup| async move { load_user(lookup.user_id).await },
//!     )?;
//!
//!     let user = get_user.call(UserLookup { user_id: 42 }).await?;
//!
//!     // Drop everything cached under "users:"
//!     cache.clear(None, Some("users")).await;
//!     Ok(())
//! }
//! ```

pub mod init;
pub mod interceptor;
pub mod invalidation;
pub mod layer;
pub mod memory;
pub mod metrics;
pub mod redis;
pub mod store;

pub use crate::init::initialize;
pub use crate::interceptor::{CacheArguments, CacheOptions, Cached, DEFAULT_TTL, Interceptor};
pub use crate::invalidation::Invalidator;
pub use crate::layer::Cache;
pub use crate::memory::MemoryStore;
pub use crate::redis::RedisStore;
pub use crate::store::{CacheStore, MAX_TTL, StoreError, StoreHandle};
