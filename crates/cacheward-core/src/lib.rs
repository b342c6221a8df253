//! # Cacheward Core
//!
//! Key derivation for the cacheward cache-aside layer.
//!
//! This crate provides:
//!
//! - [`arguments`]: the explicit argument view of a handler call and the
//!   declared set of non-cacheable arguments
//! - [`fingerprint`]: deterministic 128-bit fingerprints of calls
//! - [`key`]: namespace-qualified cache keys and key strategies
//! - [`errors`]: key derivation errors
//!
//! # Example
//!
//! ```
//! use cacheward_core::{ArgumentSet, CacheKey, ExclusionSet, KeyStrategy};
//!
//! let args = ArgumentSet::new().param("user_id", &42);
//! let local = KeyStrategy::Fingerprint
//!     .resolve("get_user", &args, &ExclusionSet::new())
//!     .unwrap();
//!
//! let key = CacheKey::compose(Some("users"), "main", &local);
//! assert!(key.as_str().starts_with("users:"));
//! ```

pub mod arguments;
pub mod errors;
pub mod fingerprint;
mod inspect;
pub mod key;

// Re-export commonly used types at crate root
pub use arguments::{Argument, ArgumentSet, ExclusionSet};
pub use errors::KeyError;
pub use fingerprint::{FINGERPRINT_LEN, canonicalize, fingerprint};
pub use key::{CacheKey, KeyBuilder, KeyStrategy, NAMESPACE_SEPARATOR, namespace_prefix};
