//! Prometheus scrape endpoint.

use axum::{extract::State, http::header, response::IntoResponse};
use metrics_exporter_prometheus::PrometheusHandle;

/// Content type of the Prometheus text exposition format.
pub const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Handler para el endpoint /metrics.
///
/// Corre el upkeep del exporter antes de renderizar, asi los histogramas de
/// latencia de jobs y requests no crecen entre scrapes.
pub async fn metrics_handler(State(prometheus): State<PrometheusHandle>) -> impl IntoResponse {
    prometheus.run_upkeep();
    (
        [(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)],
        prometheus.render(),
    )
}
