//! Rate limiter metrics recording.

use metrics::{counter, gauge};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Registra las metricas del rate limiter.
pub fn register_limiter_metrics() {
    metrics::describe_counter!(
        "tasklane_rate_limit_decisions_total",
        "Rate limiter decisions, by outcome"
    );
    metrics::describe_gauge!(
        "tasklane_rate_limit_tracked_keys",
        "Client keys currently tracked by the rate limiter"
    );
    metrics::describe_counter!(
        "tasklane_rate_limit_swept_keys_total",
        "Idle client keys removed by the sweeper"
    );
}

/// Contadores de decisiones del limiter.
#[derive(Debug, Clone, Default)]
pub struct LimiterMetrics {
    admitted: Arc<AtomicU64>,
    denied: Arc<AtomicU64>,
}

impl LimiterMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_admitted(&self) {
        self.admitted.fetch_add(1, Ordering::Relaxed);
        counter!("tasklane_rate_limit_decisions_total", "outcome" => "admitted").increment(1);
    }

    pub fn record_denied(&self) {
        self.denied.fetch_add(1, Ordering::Relaxed);
        counter!("tasklane_rate_limit_decisions_total", "outcome" => "denied").increment(1);
    }

    /// Registra un barrido de keys inactivas.
    pub fn record_sweep(&self, removed: usize, remaining: usize) {
        counter!("tasklane_rate_limit_swept_keys_total").increment(removed as u64);
        gauge!("tasklane_rate_limit_tracked_keys").set(remaining as f64);
    }

    /// Requests admitidos
    pub fn admitted(&self) -> u64 {
        self.admitted.load(Ordering::Relaxed)
    }

    /// Requests rechazados
    pub fn denied(&self) -> u64 {
        self.denied.load(Ordering::Relaxed)
    }
}
