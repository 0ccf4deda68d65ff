//! Middleware stack para el servidor HTTP.
//!
//! - `RequestIdLayer`: Genera/propaga X-Request-Id
//! - `LoggingLayer`: Logging estructurado de requests
//! - `RateLimitLayer`: Limite de requests por cliente (solo rutas de tareas)

mod logging;
mod rate_limit;
mod request_id;

pub use logging::{LoggingLayer, LoggingMiddleware};
pub use rate_limit::{RateLimitLayer, RateLimitMiddleware, client_key};
pub use request_id::{REQUEST_ID_HEADER, RequestIdLayer, RequestIdMiddleware};
