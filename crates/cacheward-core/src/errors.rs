//! Key derivation errors.
//!
//! A [`KeyError`] is a programming or configuration defect: an argument that
//! cannot be rendered deterministically, or a custom key strategy producing an
//! unusable key. These are always surfaced to the caller and never swallowed
//! by the cache layer.

/// Error raised while deriving a cache key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    #[error("argument `{argument}` has no deterministic form: {message}")]
    Unserializable { argument: String, message: String },

    #[error("cache key must not be empty")]
    EmptyKey,

    #[error("custom key builder failed: {0}")]
    Builder(String),
}

impl KeyError {
    /// Convenience constructor for custom key builders.
    pub fn builder(message: impl Into<String>) -> Self {
        Self::Builder(message.into())
    }
}
