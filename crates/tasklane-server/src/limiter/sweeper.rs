//! Background sweeper for idle rate limit keys.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info};

use super::SlidingWindowLimiter;

/// Handle for controlling a running sweeper. Dropping it stops the sweeper.
pub struct SweepHandle {
    shutdown_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl SweepHandle {
    /// Signals the sweeper to stop.
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Stops the sweeper and waits for its task to finish.
    pub async fn join(mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for SweepHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Periodically calls [`SlidingWindowLimiter::sweep`].
pub struct LimiterSweeper {
    limiter: Arc<SlidingWindowLimiter>,
    interval: Duration,
}

impl LimiterSweeper {
    /// Creates a sweeper running every `interval`. A zero interval is
    /// raised to one millisecond.
    pub fn new(limiter: Arc<SlidingWindowLimiter>, interval: Duration) -> Self {
        Self {
            limiter,
            interval: interval.max(Duration::from_millis(1)),
        }
    }

    /// Starts the background task. Must be called inside a Tokio runtime.
    pub fn start(self) -> SweepHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(shutdown_rx));

        SweepHandle {
            shutdown_tx,
            task: Some(task),
        }
    }

    async fn run(self, mut shutdown_rx: watch::Receiver<bool>) {
        let mut timer = interval_at(Instant::now() + self.interval, self.interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(interval_ms = self.interval.as_millis() as u64, "Starting rate limit sweeper");

        loop {
            tokio::select! {
                _ = timer.tick() => {
                    let removed = self.limiter.sweep();
                    debug!(
                        removed,
                        tracked = self.limiter.tracked_keys(),
                        "Rate limit sweep finished"
                    );
                }
                result = shutdown_rx.changed() => {
                    if result.is_err() || *shutdown_rx.borrow() {
                        info!("Rate limit sweeper shutting down");
                        break;
                    }
                }
            }
        }
    }
}
