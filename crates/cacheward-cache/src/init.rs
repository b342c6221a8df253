//! Store initialization.
//!
//! Connecting never fails the caller: an unreachable Redis yields an empty
//! [`StoreHandle`] and the service runs uncached.

use crate::redis::RedisStore;
use crate::store::{CacheStore, StoreHandle};
use cacheward_config::CacheConfig;
use tracing::{error, info};

/// Connects to Redis and verifies it with a write/read round trip.
///
/// Returns an empty handle when caching is disabled, the connection fails, or
/// the health check does not pass.
pub async fn initialize(config: &CacheConfig) -> StoreHandle {
    if !config.enabled {
        info!("Caching disabled by configuration, running uncached");
        return StoreHandle::none();
    }

    let store = match RedisStore::connect(config).await {
        Ok(store) => store,
        Err(e) => {
            error!(
                host = %config.hostname,
                port = config.port,
                error = %e,
                "Redis is unreachable, running in fallback mode"
            );
            return StoreHandle::none();
        }
    };

    if !store.health_check().await {
        error!(
            host = %config.hostname,
            port = config.port,
            "Redis health check failed, running in fallback mode"
        );
        return StoreHandle::none();
    }

    info!(
        host = %config.hostname,
        port = config.port,
        db = config.db,
        namespace = %config.namespace,
        "Redis cache connected"
    );

    StoreHandle::new(store)
}
