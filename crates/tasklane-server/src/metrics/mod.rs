//! Metrics module for Tasklane Server.

pub mod cache;
pub mod http;
pub mod limiter;
pub mod setup;

pub use cache::CacheMetrics;
pub use limiter::LimiterMetrics;
pub use setup::{init_metrics, register_metrics};
