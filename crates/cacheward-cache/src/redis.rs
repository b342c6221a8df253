//! Redis store for distributed caching.
//!
//! Every logical key is stored under the configured key prefix, so the cache
//! can share a Redis database with unrelated data and still flush only its own
//! keys. Each command is bounded by the configured timeout.

use crate::store::{CacheStore, MAX_TTL, StoreError};
use async_trait::async_trait;
use cacheward_config::CacheConfig;
use redis::{AsyncCommands, Client, RedisError, RedisResult, aio::ConnectionManager};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, instrument};

const HEALTH_CHECK_KEY: &str = "health_check";
const SCAN_BATCH: usize = 100;

/// Redis store backed by a reconnecting connection manager.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    key_prefix: String,
    timeout: Duration,
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore")
            .field("key_prefix", &self.key_prefix)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl From<RedisError> for StoreError {
    fn from(e: RedisError) -> Self {
        if e.is_io_error() || e.is_timeout() || e.is_connection_refusal() || e.is_connection_dropped()
        {
            StoreError::Unavailable(e.to_string())
        } else {
            StoreError::Command(e.to_string())
        }
    }
}

impl RedisStore {
    /// Connects to the Redis server described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the server cannot be reached within
    /// the configured timeout.
    pub async fn connect(config: &CacheConfig) -> Result<Self, StoreError> {
        let url = config.redis_url();
        let client = Client::open(url.as_str())?;

        let conn = tokio::time::timeout(config.timeout(), ConnectionManager::new(client))
            .await
            .map_err(|_| {
                StoreError::Unavailable(format!(
                    "connecting to {url} timed out after {}s",
                    config.timeout_seconds
                ))
            })??;

        Ok(Self {
            conn,
            key_prefix: config.key_prefix.clone(),
            timeout: config.timeout(),
        })
    }

    fn physical_key(&self, key: &str) -> String {
        if self.key_prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}:{}", self.key_prefix, key)
        }
    }

    fn logical_key<'a>(&self, physical: &'a str) -> &'a str {
        if self.key_prefix.is_empty() {
            return physical;
        }
        physical
            .strip_prefix(self.key_prefix.as_str())
            .and_then(|rest| rest.strip_prefix(':'))
            .unwrap_or(physical)
    }

    async fn run<T, F>(&self, operation: &'static str, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = RedisResult<T>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(StoreError::from),
            Err(_) => Err(StoreError::Unavailable(format!(
                "{operation} timed out after {}s",
                self.timeout.as_secs()
            ))),
        }
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    #[instrument(skip(self), fields(cache.operation = "GET"))]
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let mut conn = self.conn.clone();
        let key = self.physical_key(key);

        self.run("GET", conn.get::<_, Option<Vec<u8>>>(&key)).await
    }

    #[instrument(skip(self, value), fields(cache.operation = "SETEX"))]
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let key = self.physical_key(key);
        let seconds = ttl.min(MAX_TTL).as_secs().max(1);

        self.run("SETEX", conn.set_ex::<_, _, ()>(&key, value, seconds))
            .await?;

        debug!(cache.key = %key, cache.ttl_secs = %seconds, "Cache set");

        Ok(())
    }

    #[instrument(skip(self), fields(cache.operation = "DEL"))]
    async fn delete(&self, key: &str) -> Result<u64, StoreError> {
        let mut conn = self.conn.clone();
        let key = self.physical_key(key);

        self.run("DEL", conn.del::<_, u64>(&key)).await
    }

    #[instrument(skip(self, keys), fields(cache.operation = "DEL", cache.keys = keys.len()))]
    async fn delete_many(&self, keys: &[String]) -> Result<u64, StoreError> {
        if keys.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn.clone();
        let mut deleted = 0;

        for chunk in keys.chunks(SCAN_BATCH) {
            let physical: Vec<String> = chunk.iter().map(|k| self.physical_key(k)).collect();
            deleted += self.run("DEL", conn.del::<_, u64>(&physical)).await?;
        }

        Ok(deleted)
    }

    /// Walks the key space with `SCAN`, which is safe for production but may
    /// be slow with many keys.
    #[instrument(skip(self), fields(cache.operation = "SCAN"))]
    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut conn = self.conn.clone();
        let pattern = format!("{}*", escape_glob(&self.physical_key(prefix)));
        let mut cursor: u64 = 0;
        let mut found = Vec::new();

        loop {
            let mut cmd = redis::cmd("SCAN");
            cmd.arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH);

            let (next_cursor, keys): (u64, Vec<String>) =
                self.run("SCAN", cmd.query_async(&mut conn)).await?;

            found.extend(keys.iter().map(|k| self.logical_key(k).to_string()));

            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }

        // SCAN may return a key more than once.
        found.sort_unstable();
        found.dedup();

        debug!(cache.pattern = %pattern, cache.found = found.len(), "Prefix scan complete");

        Ok(found)
    }

    async fn health_check(&self) -> bool {
        if self.set(HEALTH_CHECK_KEY, b"ok", Duration::from_secs(1)).await.is_err() {
            return false;
        }

        matches!(self.get(HEALTH_CHECK_KEY).await, Ok(Some(value)) if value == b"ok")
    }
}

/// Escapes Redis glob metacharacters so a prefix matches literally.
fn escape_glob(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\' | '^') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
