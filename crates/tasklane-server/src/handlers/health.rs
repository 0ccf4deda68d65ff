//! Health endpoint handler.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use tasklane_worker::Pool;

use crate::state::AppState;

/// Estado del servicio tal como lo ve `/health`.
///
/// El servicio esta `UP` mientras el worker pool acepte jobs; una vez que
/// empezo el shutdown las escrituras de cache ya no se programan y se reporta
/// `DOWN`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub active_workers: usize,
    pub queued_jobs: usize,
}

impl HealthResponse {
    /// Construye el estado a partir del pool.
    pub fn from_pool(pool: &Pool) -> Self {
        Self {
            status: if pool.is_closed() { "DOWN" } else { "UP" },
            version: env!("CARGO_PKG_VERSION"),
            active_workers: pool.active_workers(),
            queued_jobs: pool.queued_jobs(),
        }
    }

    pub fn is_up(&self) -> bool {
        self.status == "UP"
    }
}

/// Handler para el endpoint /health. Responde 503 cuando el pool esta cerrado.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let health = HealthResponse::from_pool(state.tasks().pool());
    let status = if health.is_up() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(health))
}
