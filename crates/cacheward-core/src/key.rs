//! Cache key composition.
//!
//! A [`CacheKey`] is `namespace:local_key`. The local key comes from a
//! [`KeyStrategy`]: a literal, a caller-supplied builder, or (by default) the
//! fingerprint of the call.

use crate::arguments::{ArgumentSet, ExclusionSet};
use crate::errors::KeyError;
use crate::fingerprint::fingerprint;
use std::fmt;
use std::sync::Arc;

/// Separator between namespace and local key.
pub const NAMESPACE_SEPARATOR: char = ':';

/// Custom local-key derivation.
///
/// Receives the handler identity and the argument set with exclusions
/// already applied. Its output is used verbatim.
pub type KeyBuilder = Arc<dyn Fn(&str, &ArgumentSet) -> Result<String, KeyError> + Send + Sync>;

/// How the local part of a cache key is produced.
#[derive(Clone, Default)]
pub enum KeyStrategy {
    /// Fingerprint of handler identity and filtered arguments.
    #[default]
    Fingerprint,
    /// A literal key; arguments are ignored.
    Static(String),
    /// A caller-supplied builder.
    Builder(KeyBuilder),
}

impl fmt::Debug for KeyStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fingerprint => f.write_str("Fingerprint"),
            Self::Static(key) => f.debug_tuple("Static").field(key).finish(),
            Self::Builder(_) => f.write_str("Builder(..)"),
        }
    }
}

impl KeyStrategy {
    /// Wraps a closure as a [`KeyStrategy::Builder`].
    pub fn builder<F>(f: F) -> Self
    where
        F: Fn(&str, &ArgumentSet) -> Result<String, KeyError> + Send + Sync + 'static,
    {
        Self::Builder(Arc::new(f))
    }

    /// Checks what can be checked before any call is made.
    pub fn validate(&self) -> Result<(), KeyError> {
        match self {
            Self::Static(key) if key.is_empty() => Err(KeyError::EmptyKey),
            _ => Ok(()),
        }
    }

    /// Produces the local key for one call.
    pub fn resolve(
        &self,
        identity: &str,
        args: &ArgumentSet,
        excluded: &ExclusionSet,
    ) -> Result<String, KeyError> {
        let local = match self {
            Self::Static(key) => key.clone(),
            Self::Builder(build) => build(identity, &args.without(excluded))?,
            Self::Fingerprint => fingerprint(identity, args, excluded)?,
        };

        if local.is_empty() {
            return Err(KeyError::EmptyKey);
        }
        Ok(local)
    }
}

/// Fully qualified key as stored in the backing store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    full: String,
    namespace_len: usize,
}

impl CacheKey {
    /// Joins a namespace and local key.
    ///
    /// `namespace` falls back to `default_namespace` when absent or empty.
    pub fn compose(namespace: Option<&str>, default_namespace: &str, local_key: &str) -> Self {
        let namespace = namespace
            .filter(|ns| !ns.is_empty())
            .unwrap_or(default_namespace);

        Self {
            full: format!("{namespace}{NAMESPACE_SEPARATOR}{local_key}"),
            namespace_len: namespace.len(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.full[..self.namespace_len]
    }

    pub fn local_key(&self) -> &str {
        &self.full[self.namespace_len + NAMESPACE_SEPARATOR.len_utf8()..]
    }

    pub fn as_str(&self) -> &str {
        &self.full
    }

    pub fn into_string(self) -> String {
        self.full
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.full
    }
}

/// Prefix shared by every key of `namespace` (`"users"` -> `"users:"`).
pub fn namespace_prefix(namespace: &str) -> String {
    format!("{namespace}{NAMESPACE_SEPARATOR}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_with_namespace() {
        let key = CacheKey::compose(Some("users"), "main", "abc");
        assert_eq!(key.as_str(), "users:abc");
        assert_eq!(key.namespace(), "users");
        assert_eq!(key.local_key(), "abc");
    }

    #[test]
    fn test_compose_falls_back_to_default_namespace() {
        assert_eq!(CacheKey::compose(None, "main", "abc").as_str(), "main:abc");
        assert_eq!(CacheKey::compose(Some(""), "main", "abc").as_str(), "main:abc");
    }

    #[test]
    fn test_local_key_may_contain_separator() {
        let key = CacheKey::compose(Some("analytics"), "main", "stats:global");
        assert_eq!(key.namespace(), "analytics");
        assert_eq!(key.local_key(), "stats:global");
    }

    #[test]
    fn test_static_strategy_ignores_arguments() {
        let strategy = KeyStrategy::Static("global_stats".into());
        let a = strategy
            .resolve("stats", &ArgumentSet::new().positional(&1), &ExclusionSet::new())
            .unwrap();
        let b = strategy
            .resolve("stats", &ArgumentSet::new().positional(&2), &ExclusionSet::new())
            .unwrap();
        assert_eq!(a, "global_stats");
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_static_key_is_rejected() {
        assert_eq!(KeyStrategy::Static(String::new()).validate(), Err(KeyError::EmptyKey));
    }

    #[test]
    fn test_builder_receives_filtered_arguments() {
        let strategy = KeyStrategy::builder(|identity, args| {
            Ok(format!("{identity}/{}", args.len()))
        });
        let args = ArgumentSet::new()
            .param("user_id", &1)
            .param("db", &"pool");
        let excluded = ExclusionSet::new().with("db");

        assert_eq!(strategy.resolve("get_user", &args, &excluded).unwrap(), "get_user/1");
    }

    #[test]
    fn test_builder_empty_output_is_rejected() {
        let strategy = KeyStrategy::builder(|_, _| Ok(String::new()));
        let err = strategy
            .resolve("h", &ArgumentSet::new(), &ExclusionSet::new())
            .unwrap_err();
        assert_eq!(err, KeyError::EmptyKey);
    }

    #[test]
    fn test_namespace_prefix() {
        assert_eq!(namespace_prefix("users"), "users:");
    }
}
