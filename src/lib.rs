//! # Cacheward
//!
//! A demonstration HTTP service built with Axum on top of the cacheward
//! cache-aside layer.
//!
//! ## Overview
//!
//! Handlers are wrapped with [`cacheward_cache::Cache::cached`]. Each call
//! derives a key from the handler identity and its arguments, returns the
//! stored JSON on a hit, and on a miss runs the handler and writes the result
//! back with a TTL. When Redis is unreachable the service keeps answering,
//! only slower.
//!
//! ## Architecture
//!
//! ```text
//! crates/
//! ├── cacheward-core/           # Key fingerprinting, argument sets, exclusions
//! ├── cacheward-config/         # Environment configuration
//! ├── cacheward-cache/          # Store handle, interceptor, invalidation
//! └── cacheward-observability/  # Logging and Prometheus metrics
//! src/
//! ├── cli/              # clap commands (serve, clear, ping)
//! ├── modules/
//! │   ├── catalog/     # Cached demo endpoints
//! │   └── cache_admin/ # Invalidation endpoints
//! └── utils/           # Shared utilities
//! ```
//!
//! Each feature module follows a consistent structure:
//!
//! - `mod.rs`: Module exports
//! - `controller.rs`: HTTP handlers (routes)
//! - `service.rs`: Business logic
//! - `model.rs`: Request and response types
//! - `router.rs`: Axum router configuration
//!
//! ## Quick Start
//!
//! ```bash
//! REDIS_HOST=localhost
//! REDIS_PORT=6379
//! CACHE_NAMESPACE=main
//! cargo run -- serve
//! ```
//!
//! ## Modules
//!
//! - [`cli`]: Command-line interface
//! - [`modules`]: Feature modules
//! - [`router`]: Main application router
//! - [`state`]: Shared application state
//! - [`utils`]: Shared utilities (errors)

pub mod cli;
pub mod modules;
pub mod router;
pub mod state;
pub mod utils;

// Re-export workspace crates for convenience
pub use cacheward_cache;
pub use cacheward_config;
pub use cacheward_core;
pub use cacheward_observability;
