//! Redis cache configuration.
//!
//! This module provides configuration for the backing store connection and
//! the cache layer defaults, loaded from environment variables.

use std::env;
use std::time::Duration;

/// Cache configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `REDIS_HOST`: Redis server hostname (default: `localhost`)
/// - `REDIS_PORT`: Redis server port (default: `6379`)
/// - `REDIS_DB`: Redis database number (default: `0`)
/// - `CACHE_NAMESPACE`: Namespace for keys written without an explicit namespace (default: `main`)
/// - `CACHE_TIMEOUT_SECONDS`: Connect and command timeout in seconds (default: `5`)
/// - `CACHE_TTL_SECONDS`: Default TTL for cached responses in seconds (default: `60`)
/// - `CACHE_PREFIX`: Prefix isolating the managed key space in a shared Redis (default: `cacheward`)
/// - `CACHE_EXCLUDED_ARGS`: Comma separated argument names or type names never used in keys
/// - `CACHE_ENABLED`: Set to `false` or `0` to run uncached (default: `true`)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheConfig {
    /// Redis server hostname.
    pub hostname: String,

    /// Redis server port.
    pub port: u16,

    /// Redis database number.
    pub db: u8,

    /// Default namespace for cache keys.
    pub namespace: String,

    /// Connection and command timeout in seconds.
    pub timeout_seconds: u64,

    /// Default time-to-live for cached items in seconds.
    pub default_ttl_seconds: u64,

    /// Prefix for all physical keys to avoid collisions with other Redis users.
    ///
    /// An empty prefix makes the whole database the managed key space.
    pub key_prefix: String,

    /// Argument identifiers excluded from fingerprints.
    pub excluded_arguments: Vec<String>,

    /// Whether a store connection is attempted at all.
    pub enabled: bool,
}

impl CacheConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Unparseable values fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            hostname: lookup("REDIS_HOST")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.hostname),
            port: lookup("REDIS_PORT")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.port),
            db: lookup("REDIS_DB")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.db),
            namespace: lookup("CACHE_NAMESPACE")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.namespace),
            timeout_seconds: lookup("CACHE_TIMEOUT_SECONDS")
                .and_then(|v| v.trim().parse().ok())
                .filter(|v| *v > 0)
                .unwrap_or(defaults.timeout_seconds),
            default_ttl_seconds: lookup("CACHE_TTL_SECONDS")
                .and_then(|v| v.trim().parse().ok())
                .filter(|v| *v > 0)
                .unwrap_or(defaults.default_ttl_seconds),
            key_prefix: lookup("CACHE_PREFIX").unwrap_or(defaults.key_prefix),
            excluded_arguments: lookup("CACHE_EXCLUDED_ARGS")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            enabled: lookup("CACHE_ENABLED")
                .map(|v| {
                    let v = v.trim().to_lowercase();
                    v != "false" && v != "0"
                })
                .unwrap_or(defaults.enabled),
        }
    }

    /// Redis connection URL, e.g. `redis://localhost:6379/0`.
    ///
    /// IPv6 literals are bracketed: `redis://[::1]:6379/0`.
    pub fn redis_url(&self) -> String {
        let host = &self.hostname;
        if host.contains(':') && !host.starts_with('[') {
            format!("redis://[{}]:{}/{}", host, self.port, self.db)
        } else {
            format!("redis://{}:{}/{}", host, self.port, self.db)
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_seconds)
    }

    /// Build a physical key inside the managed key space.
    ///
    /// # Example
    ///
    /// ```
    /// use cacheward_config::CacheConfig;
    ///
    /// let config = CacheConfig::default();
    /// assert_eq!(config.prefixed_key("users:abc"), "cacheward:users:abc");
    /// ```
    pub fn prefixed_key(&self, key: &str) -> String {
        if self.key_prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}:{}", self.key_prefix, key)
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            hostname: "localhost".into(),
            port: 6379,
            db: 0,
            namespace: "main".into(),
            timeout_seconds: 5,
            default_ttl_seconds: 60,
            key_prefix: "cacheward".into(),
            excluded_arguments: Vec::new(),
            enabled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = CacheConfig::from_lookup(lookup(&[]));
        assert_eq!(config, CacheConfig::default());
        assert_eq!(config.redis_url(), "redis://localhost:6379/0");
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_overrides() {
        let config = CacheConfig::from_lookup(lookup(&[
            ("REDIS_HOST", "cache.internal"),
            ("REDIS_PORT", "6380"),
            ("REDIS_DB", "3"),
            ("CACHE_NAMESPACE", "fastapi_app"),
            ("CACHE_TTL_SECONDS", "120"),
            ("CACHE_EXCLUDED_ARGS", "request, db ,,Session"),
            ("CACHE_ENABLED", "FALSE"),
        ]));

        assert_eq!(config.redis_url(), "redis://cache.internal:6380/3");
        assert_eq!(config.namespace, "fastapi_app");
        assert_eq!(config.default_ttl_seconds, 120);
        assert_eq!(config.excluded_arguments, vec!["request", "db", "Session"]);
        assert!(!config.enabled);
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = CacheConfig::from_lookup(lookup(&[
            ("REDIS_PORT", "not-a-port"),
            ("CACHE_TIMEOUT_SECONDS", "0"),
        ]));
        assert_eq!(config.port, 6379);
        assert_eq!(config.timeout_seconds, 5);
    }

    #[test]
    fn test_ipv6_host_is_bracketed() {
        let config = CacheConfig::from_lookup(lookup(&[("REDIS_HOST", "::1")]));
        assert_eq!(config.redis_url(), "redis://[::1]:6379/0");

        let config = CacheConfig::from_lookup(lookup(&[("REDIS_HOST", "[fe80::1]")]));
        assert_eq!(config.redis_url(), "redis://[fe80::1]:6379/0");
    }

    #[test]
    fn test_empty_prefix() {
        let config = CacheConfig::from_lookup(lookup(&[("CACHE_PREFIX", "")]));
        assert_eq!(config.prefixed_key("main:abc"), "main:abc");
    }
}
