use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceBuilder;

use crate::handlers::{
    health::health_check,
    metrics::metrics_handler,
    tasks::{create_task, delete_task, get_task, list_tasks, update_task},
};
use crate::limiter::SlidingWindowLimiter;
use crate::middleware::{LoggingLayer, RateLimitLayer, RequestIdLayer};
use crate::state::AppState;

/// Creates the application router.
///
/// Task routes are rate limited per client; `/health` is not.
pub fn create_router(state: AppState, limiter: Arc<SlidingWindowLimiter>) -> Router {
    let middleware_stack = ServiceBuilder::new()
        .layer(RequestIdLayer)
        .layer(LoggingLayer);

    let task_router = Router::new()
        .route("/tasks", post(create_task).get(list_tasks))
        .route(
            "/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .layer(RateLimitLayer::new(limiter));

    Router::new()
        .route("/health", get(health_check))
        .merge(task_router)
        .with_state(state)
        // HTTP metrics middleware
        .layer(middleware::from_fn(
            crate::metrics::http::http_metrics_middleware,
        ))
        .layer(middleware_stack)
}

/// Creates the application router plus the `/metrics` endpoint.
pub fn create_router_with_metrics(
    state: AppState,
    limiter: Arc<SlidingWindowLimiter>,
    prometheus_handle: PrometheusHandle,
) -> Router {
    // Router for metrics endpoint (different state)
    let metrics_router = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(prometheus_handle);

    create_router(state, limiter).merge(metrics_router)
}

/// Serves until a shutdown signal arrives and in-flight requests finish.
///
/// Background components (pool, sweeper) are left running; the caller stops
/// them once this returns.
pub async fn run_server_with_state(
    addr: SocketAddr,
    state: AppState,
    limiter: Arc<SlidingWindowLimiter>,
    prometheus_handle: PrometheusHandle,
) -> Result<(), std::io::Error> {
    let app = create_router_with_metrics(state, limiter, prometheus_handle);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
}

/// Completes on Ctrl+C or, on Unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
