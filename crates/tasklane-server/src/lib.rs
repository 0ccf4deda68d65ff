//! Tasklane Server - HTTP service for Tasklane
//!
//! Serves the task API over Axum. Reads go through a cache-aside
//! [`TaskService`](service::TaskService) whose cache writes run on a
//! background worker pool, and every task route sits behind a per-client
//! sliding-window rate limiter.

pub mod cache;
pub mod config;
pub mod error;
pub mod handlers;
pub mod limiter;
pub mod metrics;
pub mod middleware;
pub mod server;
pub mod service;
pub mod state;
pub mod store;

pub use config::{AppConfig, ConfigError};
pub use error::AppError;
pub use handlers::health::HealthResponse;
pub use server::{create_router, create_router_with_metrics, run_server_with_state, shutdown_signal};
pub use state::AppState;
