use anyhow::Context;
use cacheward::cli::{self, Cli, Commands};
use cacheward::router::init_router;
use cacheward::state::init_app_state;
use cacheward_cache::Cache;
use cacheward_config::{CacheConfig, ServerConfig};
use cacheward_observability::{init_logging, init_metrics, metrics_app};
use clap::Parser;
use dotenvy::dotenv;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    let cli = Cli::parse();
    let config = CacheConfig::from_env();

    match cli.command.unwrap_or_default() {
        Commands::Serve { bind } => serve(&config, bind).await,
        Commands::Clear { key, namespace } => {
            let cache = Cache::from_config(&config).await;
            let deleted = cli::clear(&cache, key.as_deref(), namespace.as_deref()).await;
            println!("Deleted {deleted} cache entries");
            Ok(())
        }
        Commands::Ping => {
            let cache = Cache::from_config(&config).await;
            if cli::ping(&cache).await {
                println!("Redis at {} is reachable", config.redis_url());
                Ok(())
            } else {
                eprintln!("Redis at {} is unreachable", config.redis_url());
                std::process::exit(1);
            }
        }
    }
}

async fn serve(config: &CacheConfig, bind: Option<String>) -> anyhow::Result<()> {
    let server_config = ServerConfig::from_env();
    let bind_addr = bind.unwrap_or(server_config.bind_addr);

    let state = init_app_state(config).await;
    if !state.cache.is_enabled() {
        warn!("Serving without a cache store, every request runs its handler");
    }

    let mut app = init_router(state);
    match init_metrics() {
        Ok(Some(handle)) => app = app.merge(metrics_app(handle)),
        Ok(None) => {}
        Err(e) => warn!(error = %e, "Failed to install metrics recorder"),
    }

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    info!("Server running on http://{bind_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
