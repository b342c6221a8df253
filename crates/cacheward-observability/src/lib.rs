//! Cacheward Observability Module
//!
//! Provides:
//! - Console logging via `tracing-subscriber`
//! - HTTP request logging middleware
//! - Prometheus metrics exporter for the cache counters
//!
//! At runtime, metrics can be switched off via the `OBSERVABILITY_ENABLED` environment variable.
//!
//! # Examples
//!
//! ```no_run
//! use cacheward_observability::{init_logging, init_metrics};
//!
//! #[tokio::main]
//! async fn main() {
//!     init_logging();
//!     let _handle = init_metrics().expect("metrics recorder");
//!     // ... application code ...
//! }
//! ```

pub mod logging;
pub mod metrics;

pub use crate::logging::{init_logging, logging_middleware};
pub use crate::metrics::{init_metrics, is_observability_enabled, metrics_app, metrics_middleware};
pub use metrics_exporter_prometheus::PrometheusHandle;
