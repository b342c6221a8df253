use cacheward_cache::Cache;
use cacheward_config::CacheConfig;

#[derive(Clone, Debug)]
pub struct AppState {
    pub cache: Cache,
}

/// Connects the cache layer. Never fails: an unreachable Redis leaves the
/// service running uncached.
pub async fn init_app_state(config: &CacheConfig) -> AppState {
    AppState {
        cache: Cache::from_config(config).await,
    }
}
