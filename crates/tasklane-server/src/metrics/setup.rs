//! Metrics setup and initialization.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::info;

use super::{cache, http, limiter};

/// Buckets para histogramas, en segundos (100us .. 10s).
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Instala el recorder global de Prometheus y retorna el handle para el
/// endpoint `/metrics`.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new()
        .set_buckets(LATENCY_BUCKETS)?
        .install_recorder()?;

    register_metrics();
    info!("Metrics system initialized");
    Ok(handle)
}

/// Describe todas las metricas del servidor y del pool.
pub fn register_metrics() {
    http::register_http_metrics();
    cache::register_cache_metrics();
    limiter::register_limiter_metrics();
    tasklane_worker::metrics::register_pool_metrics();
}
