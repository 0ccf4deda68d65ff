//! Tasklane Server binary.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tasklane_server::cache::MokaCacheStore;
use tasklane_server::config::{AppConfig, CONFIG_PATH_ENV};
use tasklane_server::limiter::{LimiterSweeper, SlidingWindowLimiter};
use tasklane_server::metrics::init_metrics;
use tasklane_server::service::TaskService;
use tasklane_server::store::MemoryTaskStore;
use tasklane_server::{AppState, run_server_with_state};
use tasklane_worker::Pool;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
    let config = AppConfig::load(config_path.as_deref()).context("loading configuration")?;
    let addr = config.server.socket_addr()?;

    tracing::info!("Starting Tasklane Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        workers = config.pool.workers,
        queue_capacity = config.pool.queue_capacity,
        rate_limit = config.rate_limit.requests,
        window_secs = config.rate_limit.window_secs,
        cache_ttl_secs = config.cache.ttl_secs,
        "Configuration loaded"
    );

    let prometheus = init_metrics().context("installing metrics recorder")?;

    let pool = Arc::new(Pool::new(config.pool.to_pool_config()).context("starting worker pool")?);
    let service = TaskService::new(
        Arc::new(MemoryTaskStore::new()),
        Arc::new(MokaCacheStore::new(config.cache.max_capacity)),
        Arc::clone(&pool),
        config.cache.ttl(),
    );

    let limit = config
        .rate_limit
        .limit()
        .context("rate_limit.requests must be at least 1")?;
    let limiter = Arc::new(
        SlidingWindowLimiter::new(limit, config.rate_limit.window())
            .with_idle_windows(config.rate_limit.idle_windows),
    );
    let sweeper =
        LimiterSweeper::new(Arc::clone(&limiter), config.rate_limit.sweep_interval()).start();

    let served = run_server_with_state(addr, AppState::new(service), limiter, prometheus).await;

    // Teardown order: HTTP is done, then background sweeping, then queued cache work.
    sweeper.join().await;
    let report = pool.shutdown().await;
    tracing::info!(
        drained = report.drained,
        dropped = report.dropped,
        "Tasklane Server stopped"
    );

    served.context("serving HTTP")
}
