//! Worker execution loop.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{Mutex, Semaphore, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::job::{Job, JobContext};
use crate::metrics::PoolMetrics;

pub(crate) type SharedReceiver = Arc<Mutex<mpsc::Receiver<Job>>>;

/// A long-lived executor bound to the shared queue.
pub(crate) struct Worker {
    id: usize,
    receiver: SharedReceiver,
    cancel: CancellationToken,
    /// Set when the pool has no queue: one permit per idle worker.
    handoff: Option<Arc<Semaphore>>,
    metrics: PoolMetrics,
}

impl Worker {
    pub(crate) fn new(
        id: usize,
        receiver: SharedReceiver,
        cancel: CancellationToken,
        handoff: Option<Arc<Semaphore>>,
        metrics: PoolMetrics,
    ) -> Self {
        Self {
            id,
            receiver,
            cancel,
            handoff,
            metrics,
        }
    }

    /// Runs jobs until the queue is closed and empty, or the pool is cancelled.
    pub(crate) async fn run(self) {
        debug!(worker = self.id, "Worker started");

        while let Some(job) = self.next_job().await {
            self.execute(job).await;
        }

        debug!(worker = self.id, "Worker stopped");
    }

    /// Waits for the next job. Cancellation wins over a ready job.
    async fn next_job(&self) -> Option<Job> {
        if let Some(handoff) = &self.handoff {
            handoff.add_permits(1);
        }

        let mut receiver = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return None,
            guard = self.receiver.lock() => guard,
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            job = receiver.recv() => job,
        }
    }

    async fn execute(&self, job: Job) {
        let job_id = job.id;
        let name = job.name.clone();
        let sink = job.on_error.clone();
        let ctx = JobContext::new(self.id, job_id, self.cancel.child_token());

        let start = Instant::now();
        let result = job.run(ctx).await;
        let elapsed = start.elapsed();

        match result {
            Ok(()) => {
                self.metrics.record_completed(elapsed);
                debug!(worker = self.id, job = %name, job_id, "Job completed");
            },
            Err(error) => {
                self.metrics.record_failed(elapsed);
                warn!(
                    worker = self.id,
                    job = %name,
                    job_id,
                    error = %error,
                    "Job failed"
                );
                if let Some(sink) = sink {
                    sink(&name, &error);
                }
            },
        }
    }
}
