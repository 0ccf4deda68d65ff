//! Fixed-size worker pool over a bounded queue.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::{Mutex, Semaphore, TryAcquireError, mpsc};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use crate::error::PoolError;
use crate::job::Job;
use crate::metrics::PoolMetrics;
use crate::worker::{SharedReceiver, Worker};

/// Configuration for the worker pool.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Number of workers started with the pool.
    pub workers: usize,
    /// Jobs that may wait in the queue before `submit` starts waiting.
    ///
    /// Zero means hand-off: a job is only accepted once a worker is idle and
    /// ready to take it.
    pub queue_capacity: usize,
    /// How long `shutdown` lets workers drain the queue before cancelling.
    pub drain_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: 10,
            queue_capacity: 100,
            drain_timeout: Duration::from_secs(5),
        }
    }
}

impl PoolConfig {
    /// Creates a configuration with the default drain timeout.
    pub fn new(workers: usize, queue_capacity: usize) -> Self {
        Self {
            workers,
            queue_capacity,
            ..Self::default()
        }
    }

    /// Sets the drain timeout.
    pub fn with_drain_timeout(mut self, drain_timeout: Duration) -> Self {
        self.drain_timeout = drain_timeout;
        self
    }

    /// Checks the configuration can build a pool.
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.workers == 0 {
            return Err(PoolError::InvalidConfig(
                "workers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn is_handoff(&self) -> bool {
        self.queue_capacity == 0
    }

    /// Slots in the underlying channel. In hand-off mode each idle worker
    /// holds at most one outstanding permit, so one slot per worker is enough.
    fn channel_capacity(&self) -> usize {
        if self.is_handoff() {
            self.workers
        } else {
            self.queue_capacity
        }
    }
}

/// What happened to queued work during shutdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// True if the workers finished the queue within the drain timeout.
    pub drained: bool,
    /// Jobs discarded without running.
    pub dropped: usize,
}

/// A fixed number of workers consuming one bounded queue.
///
/// Shutdown happens in two phases. First the pool stops accepting jobs, and
/// submitters still waiting for space get `PoolError::Closed`, so no
/// submitter can race the teardown of the queue. Then the workers drain what
/// is queued for at most `drain_timeout`; if that expires the shared
/// cancellation token fires, running jobs see it through their
/// [`JobContext`](crate::JobContext), and whatever is still queued is dropped
/// and counted.
///
/// The pool must be created inside a Tokio runtime.
pub struct Pool {
    sender: RwLock<Option<mpsc::Sender<Job>>>,
    receiver: SharedReceiver,
    closed: AtomicBool,
    closing: CancellationToken,
    cancel: CancellationToken,
    handoff: Option<Arc<Semaphore>>,
    tracker: TaskTracker,
    next_job_id: AtomicU64,
    metrics: PoolMetrics,
    config: PoolConfig,
}

impl Pool {
    /// Creates the pool and starts every worker.
    pub fn new(config: PoolConfig) -> Result<Self, PoolError> {
        config.validate()?;

        let (sender, receiver) = mpsc::channel(config.channel_capacity());
        let receiver: SharedReceiver = Arc::new(Mutex::new(receiver));
        let cancel = CancellationToken::new();
        let tracker = TaskTracker::new();
        let metrics = PoolMetrics::new();
        let handoff = config.is_handoff().then(|| Arc::new(Semaphore::new(0)));

        for id in 0..config.workers {
            let worker = Worker::new(
                id,
                Arc::clone(&receiver),
                cancel.clone(),
                handoff.clone(),
                metrics.clone(),
            );
            tracker.spawn(worker.run());
        }

        info!(
            workers = config.workers,
            queue_capacity = config.queue_capacity,
            "Worker pool started"
        );

        Ok(Self {
            sender: RwLock::new(Some(sender)),
            receiver,
            closed: AtomicBool::new(false),
            closing: CancellationToken::new(),
            cancel,
            handoff,
            tracker,
            next_job_id: AtomicU64::new(1),
            metrics,
            config,
        })
    }

    /// Enqueues a job, waiting while the queue is full.
    ///
    /// Returns `PoolError::Closed` if the pool is shutting down, including
    /// when shutdown starts while this call is waiting for space.
    pub async fn submit(&self, job: Job) -> Result<(), PoolError> {
        let sender = self.sender()?;
        let job = self.stamp(job);
        let (id, name) = (job.id, job.name.clone());

        let sent = tokio::select! {
            biased;
            _ = self.closing.cancelled() => Err(PoolError::Closed),
            sent = self.send(&sender, job) => sent,
        };
        self.record_submission(&sender, id, &name, sent)
    }

    /// Enqueues a job only if there is space right now.
    pub fn try_submit(&self, job: Job) -> Result<(), PoolError> {
        let sender = self.sender()?;
        let job = self.stamp(job);
        let (id, name) = (job.id, job.name.clone());

        let sent = self.try_reserve_handoff().and_then(|()| {
            sender.try_send(job).map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => PoolError::Busy,
                mpsc::error::TrySendError::Closed(_) => PoolError::Closed,
            })
        });
        self.record_submission(&sender, id, &name, sent)
    }

    /// Enqueues a job, waiting at most `timeout` for space.
    pub async fn submit_timeout(&self, job: Job, timeout: Duration) -> Result<(), PoolError> {
        let sender = self.sender()?;
        let job = self.stamp(job);
        let (id, name) = (job.id, job.name.clone());

        let sent = tokio::select! {
            biased;
            _ = self.closing.cancelled() => Err(PoolError::Closed),
            sent = tokio::time::timeout(timeout, self.send(&sender, job)) => match sent {
                Ok(sent) => sent,
                Err(_) => Err(PoolError::Busy),
            },
        };
        self.record_submission(&sender, id, &name, sent)
    }

    /// Stops accepting jobs, drains the queue for up to the drain timeout,
    /// then cancels and waits for every worker to exit.
    ///
    /// Only the first call performs the shutdown; later calls wait for the
    /// workers to be gone and report nothing dropped.
    pub async fn shutdown(&self) -> ShutdownReport {
        let queued = self.queued_jobs();
        if !self.close() {
            self.tracker.wait().await;
            return ShutdownReport {
                drained: true,
                dropped: 0,
            };
        }

        info!(
            queued,
            drain_timeout_ms = self.config.drain_timeout.as_millis() as u64,
            "Worker pool shutting down"
        );

        let drained = tokio::time::timeout(self.config.drain_timeout, self.tracker.wait())
            .await
            .is_ok();

        if !drained {
            warn!(
                active_workers = self.tracker.len(),
                "Drain timeout reached, cancelling workers"
            );
        }
        self.cancel.cancel();
        self.tracker.wait().await;

        let dropped = self.release_queue().await;
        info!(drained, dropped, "Worker pool stopped");

        ShutdownReport { drained, dropped }
    }

    /// Cancels immediately: workers stop taking jobs and every queued job is
    /// dropped.
    pub async fn shutdown_now(&self) -> ShutdownReport {
        let first = self.close();
        self.cancel.cancel();
        self.tracker.wait().await;

        let dropped = if first { self.release_queue().await } else { 0 };
        if first {
            info!(dropped, "Worker pool cancelled");
        }

        ShutdownReport {
            drained: dropped == 0,
            dropped,
        }
    }

    /// Returns true once shutdown has begun.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Number of workers still running.
    pub fn active_workers(&self) -> usize {
        self.tracker.len()
    }

    /// Jobs waiting in the queue.
    pub fn queued_jobs(&self) -> usize {
        self.sender
            .read()
            .as_ref()
            .map(|s| s.max_capacity() - s.capacity())
            .unwrap_or(0)
    }

    /// Returns the pool metrics.
    pub fn metrics(&self) -> &PoolMetrics {
        &self.metrics
    }

    /// Returns the configuration the pool was built with.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    fn sender(&self) -> Result<mpsc::Sender<Job>, PoolError> {
        if self.is_closed() {
            self.metrics.record_rejected();
            return Err(PoolError::Closed);
        }
        self.sender.read().clone().ok_or_else(|| {
            self.metrics.record_rejected();
            PoolError::Closed
        })
    }

    /// Waits for a hand-off permit, when the pool has no queue, then sends.
    async fn send(&self, sender: &mpsc::Sender<Job>, job: Job) -> Result<(), PoolError> {
        if let Some(handoff) = &self.handoff {
            handoff
                .acquire()
                .await
                .map_err(|_| PoolError::Closed)?
                .forget();
        }
        sender.send(job).await.map_err(|_| PoolError::Closed)
    }

    fn try_reserve_handoff(&self) -> Result<(), PoolError> {
        match &self.handoff {
            None => Ok(()),
            Some(handoff) => match handoff.try_acquire() {
                Ok(permit) => {
                    permit.forget();
                    Ok(())
                },
                Err(TryAcquireError::NoPermits) => Err(PoolError::Busy),
                Err(TryAcquireError::Closed) => Err(PoolError::Closed),
            },
        }
    }

    fn stamp(&self, mut job: Job) -> Job {
        job.id = self.next_job_id.fetch_add(1, Ordering::Relaxed);
        job
    }

    fn record_submission(
        &self,
        sender: &mpsc::Sender<Job>,
        id: u64,
        name: &str,
        sent: Result<(), PoolError>,
    ) -> Result<(), PoolError> {
        match &sent {
            Ok(()) => {
                self.metrics.record_submitted();
                self.metrics
                    .update_queued(sender.max_capacity() - sender.capacity());
                debug!(job = %name, job_id = id, "Job submitted");
            },
            Err(error) => {
                self.metrics.record_rejected();
                debug!(job = %name, job_id = id, error = %error, "Job rejected");
            },
        }
        sent
    }

    /// Flips the closed flag and drops the pool's sender. Returns true for
    /// the caller that actually closed the pool.
    ///
    /// Submitters waiting for space are released with `Closed`, after which
    /// the channel closes and draining workers observe the end of the queue.
    fn close(&self) -> bool {
        if self.closed.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.closing.cancel();
        if let Some(handoff) = &self.handoff {
            handoff.close();
        }
        self.sender.write().take();
        self.tracker.close();
        true
    }

    /// Closes the receiver and discards what is left in it.
    async fn release_queue(&self) -> usize {
        let mut receiver = self.receiver.lock().await;
        receiver.close();

        let mut dropped = 0;
        while let Ok(job) = receiver.try_recv() {
            debug!(job = %job.name, job_id = job.id, "Dropping queued job");
            dropped += 1;
        }

        if dropped > 0 {
            self.metrics.record_dropped(dropped as u64);
        }
        self.metrics.update_queued(0);
        dropped
    }
}

impl Drop for Pool {
    fn drop(&mut self) {
        if !self.is_closed() {
            self.closing.cancel();
            self.cancel.cancel();
        }
    }
}
