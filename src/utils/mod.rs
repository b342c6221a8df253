//! Shared utilities for the demo service.
//!
//! - [`errors`]: Application error type and its HTTP mapping

pub mod errors;
