//! Command line surface of the `cacheward` binary.

use cacheward_cache::Cache;
use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "cacheward")]
#[command(about = "Cache-aside demo service and cache maintenance tools", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the HTTP service (default)
    Serve {
        /// Listen address, overrides BIND_ADDR
        #[arg(short = 'b', long)]
        bind: Option<String>,
    },
    /// Invalidate cache entries
    Clear {
        /// Logical key to delete
        #[arg(short = 'k', long)]
        key: Option<String>,

        /// Namespace to clear, or to resolve the key in
        #[arg(short = 'n', long)]
        namespace: Option<String>,
    },
    /// Check that the configured store is reachable
    Ping,
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Serve { bind: None }
    }
}

/// Runs `clear` and returns the number of deleted keys.
pub async fn clear(cache: &Cache, key: Option<&str>, namespace: Option<&str>) -> u64 {
    let deleted = cache.clear(key, namespace).await;
    info!(?key, ?namespace, deleted, "Cache cleared");
    deleted
}

/// Runs `ping`. `true` when the store answered the health check.
pub async fn ping(cache: &Cache) -> bool {
    cache.is_enabled() && cache.health_check().await
}
