//! # Cacheward Config
//!
//! Configuration types for cacheward.
//!
//! This crate provides configuration structures loaded from environment variables:
//!
//! - [`cache`]: Redis connection and cache layer defaults
//! - [`server`]: HTTP listener settings for the demo service
//!
//! # Example
//!
//! ```ignore
//! use cacheward_config::{CacheConfig, ServerConfig};
//!
//! let cache_config = CacheConfig::from_env();
//! let server_config = ServerConfig::from_env();
//! ```

pub mod cache;
pub mod server;

// Re-export commonly used types at crate root
pub use cache::CacheConfig;
pub use server::ServerConfig;
