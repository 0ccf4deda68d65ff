//! Pool metrics recording.

use metrics::{counter, gauge, histogram};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Describes the pool metrics. Call once at startup.
pub fn register_pool_metrics() {
    metrics::describe_counter!(
        "tasklane_pool_jobs_total",
        "Jobs handled by the worker pool, by outcome"
    );
    metrics::describe_gauge!("tasklane_pool_queued_jobs", "Jobs waiting in the pool queue");
    metrics::describe_histogram!(
        "tasklane_pool_job_seconds",
        "Time spent running a job"
    );
}

/// Counters for the lifetime of one pool.
///
/// Atomic counters back the accessors so tests and health checks can read
/// them without a metrics recorder installed.
#[derive(Debug, Clone, Default)]
pub struct PoolMetrics {
    submitted: Arc<AtomicU64>,
    completed: Arc<AtomicU64>,
    failed: Arc<AtomicU64>,
    dropped: Arc<AtomicU64>,
    rejected: Arc<AtomicU64>,
}

impl PoolMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
        counter!("tasklane_pool_jobs_total", "outcome" => "submitted").increment(1);
    }

    pub(crate) fn record_completed(&self, duration: Duration) {
        self.completed.fetch_add(1, Ordering::Relaxed);
        counter!("tasklane_pool_jobs_total", "outcome" => "completed").increment(1);
        histogram!("tasklane_pool_job_seconds").record(duration.as_secs_f64());
    }

    pub(crate) fn record_failed(&self, duration: Duration) {
        self.failed.fetch_add(1, Ordering::Relaxed);
        counter!("tasklane_pool_jobs_total", "outcome" => "failed").increment(1);
        histogram!("tasklane_pool_job_seconds").record(duration.as_secs_f64());
    }

    pub(crate) fn record_dropped(&self, count: u64) {
        self.dropped.fetch_add(count, Ordering::Relaxed);
        counter!("tasklane_pool_jobs_total", "outcome" => "dropped").increment(count);
    }

    pub(crate) fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
        counter!("tasklane_pool_jobs_total", "outcome" => "rejected").increment(1);
    }

    pub(crate) fn update_queued(&self, queued: usize) {
        gauge!("tasklane_pool_queued_jobs").set(queued as f64);
    }

    /// Jobs accepted into the queue.
    pub fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::Relaxed)
    }

    /// Jobs that ran and succeeded.
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    /// Jobs that ran and failed, panicked or were cancelled.
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Jobs discarded from the queue at shutdown without running.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Submissions refused because the pool was closed or busy.
    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let metrics = PoolMetrics::new();

        metrics.record_submitted();
        metrics.record_submitted();
        metrics.record_completed(Duration::from_millis(1));
        metrics.record_failed(Duration::from_millis(2));
        metrics.record_dropped(3);
        metrics.record_rejected();

        assert_eq!(metrics.submitted(), 2);
        assert_eq!(metrics.completed(), 1);
        assert_eq!(metrics.failed(), 1);
        assert_eq!(metrics.dropped(), 3);
        assert_eq!(metrics.rejected(), 1);
    }

    #[test]
    fn test_clones_share_counters() {
        let metrics = PoolMetrics::new();
        let clone = metrics.clone();

        clone.record_submitted();
        assert_eq!(metrics.submitted(), 1);
    }
}
