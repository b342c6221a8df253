//! Cache counters.
//!
//! Recorded through the `metrics` facade; they are no-ops until the host
//! process installs a recorder (see `cacheward-observability`).

use metrics::counter;

/// Outcome of a cache lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOutcome {
    Hit,
    Miss,
    Corrupt,
    StoreDown,
    /// No store configured; the handler ran uncached.
    Bypass,
}

impl LookupOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::Miss => "miss",
            Self::Corrupt => "corrupt",
            Self::StoreDown => "store_down",
            Self::Bypass => "bypass",
        }
    }
}

pub fn track_lookup(namespace: &str, outcome: LookupOutcome) {
    counter!(
        "cache_lookups_total",
        "namespace" => namespace.to_string(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
}

/// `status` is one of `ok`, `error` or `skipped`.
pub fn track_writeback(namespace: &str, status: &'static str) {
    counter!(
        "cache_writebacks_total",
        "namespace" => namespace.to_string(),
        "status" => status
    )
    .increment(1);
}

pub fn track_encoding_error(namespace: &str) {
    counter!("cache_encoding_errors_total", "namespace" => namespace.to_string()).increment(1);
}

pub fn track_invalidation(scope: &'static str, deleted: u64) {
    counter!("cache_invalidated_keys_total", "scope" => scope).increment(deleted);
}
