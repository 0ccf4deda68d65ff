//! Sliding-window log limiter.

use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;
use tracing::debug;

use crate::metrics::LimiterMetrics;

/// Default number of idle windows after which a key may be swept.
pub const DEFAULT_IDLE_WINDOWS: u32 = 3;

/// Shortest window a limiter runs with. Shorter windows are raised to this.
pub const MIN_WINDOW: Duration = Duration::from_millis(1);

/// Admits at most `limit` requests per key within any trailing `window`.
///
/// Each key keeps the instants of its admitted requests. A request is
/// admitted if fewer than `limit` of those are younger than `window`; an
/// instant exactly `window` old has already left the window. Denied requests
/// are not recorded, so a client hammering the limiter regains access as soon
/// as its oldest admitted request ages out.
///
/// Keys live in a sharded map, so contention is per shard rather than global.
/// The check and the record for one key happen under that key's shard lock.
///
/// # Examples
///
/// ```
/// use std::num::NonZeroUsize;
/// use std::time::Duration;
/// use tasklane_server::limiter::SlidingWindowLimiter;
///
/// let limiter = SlidingWindowLimiter::new(NonZeroUsize::new(2).unwrap(), Duration::from_secs(60));
///
/// assert!(limiter.allow("10.0.0.1"));
/// assert!(limiter.allow("10.0.0.1"));
/// assert!(!limiter.allow("10.0.0.1"));
/// assert!(limiter.allow("10.0.0.2"));
/// ```
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    windows: DashMap<String, VecDeque<Instant>>,
    limit: NonZeroUsize,
    window: Duration,
    idle_windows: u32,
    metrics: LimiterMetrics,
}

impl SlidingWindowLimiter {
    /// Creates a limiter of `limit` requests per `window`.
    ///
    /// A `window` shorter than [`MIN_WINDOW`] is raised to it, so a zero window
    /// still limits.
    pub fn new(limit: NonZeroUsize, window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            limit,
            window: window.max(MIN_WINDOW),
            idle_windows: DEFAULT_IDLE_WINDOWS,
            metrics: LimiterMetrics::new(),
        }
    }

    /// Sets how many whole windows a key must be idle before `sweep` drops it.
    pub fn with_idle_windows(mut self, idle_windows: u32) -> Self {
        self.idle_windows = idle_windows.max(1);
        self
    }

    /// Decides whether a request for `key` arriving now is admitted, and
    /// records it if so.
    pub fn allow(&self, key: &str) -> bool {
        self.allow_at(key, Instant::now())
    }

    /// Same as [`allow`](Self::allow) for a request arriving at `now`.
    pub fn allow_at(&self, key: &str, now: Instant) -> bool {
        let admitted = match self.windows.get_mut(key) {
            Some(mut timestamps) => self.admit(&mut timestamps, now),
            None => {
                let mut timestamps = self.windows.entry(key.to_string()).or_default();
                self.admit(&mut timestamps, now)
            },
        };

        if admitted {
            self.metrics.record_admitted();
        } else {
            self.metrics.record_denied();
            debug!(client = %key, limit = self.limit.get(), "Request denied by rate limiter");
        }
        admitted
    }

    fn admit(&self, timestamps: &mut VecDeque<Instant>, now: Instant) -> bool {
        let window = self.window;
        // Concurrent callers may record slightly out of order, so prune by
        // value instead of popping the front.
        timestamps.retain(|&at| now.saturating_duration_since(at) < window);

        if timestamps.len() < self.limit.get() {
            timestamps.push_back(now);
            true
        } else {
            false
        }
    }

    /// Drops keys with no admitted request in the last `idle_windows`
    /// windows. Returns how many keys were removed.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    /// Same as [`sweep`](Self::sweep) as of `now`.
    pub fn sweep_at(&self, now: Instant) -> usize {
        let idle_after = self.idle_after();
        let before = self.windows.len();

        self.windows.retain(|_, timestamps| {
            timestamps
                .iter()
                .max()
                .is_some_and(|&last| now.saturating_duration_since(last) < idle_after)
        });

        let remaining = self.windows.len();
        let removed = before.saturating_sub(remaining);
        self.metrics.record_sweep(removed, remaining);
        if removed > 0 {
            debug!(removed, remaining, "Swept idle rate limit keys");
        }
        removed
    }

    /// Requests still counted against `key` as of now.
    pub fn in_window(&self, key: &str) -> usize {
        let now = Instant::now();
        self.windows
            .get(key)
            .map(|timestamps| {
                timestamps
                    .iter()
                    .filter(|&&at| now.saturating_duration_since(at) < self.window)
                    .count()
            })
            .unwrap_or(0)
    }

    /// Number of keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }

    pub fn limit(&self) -> usize {
        self.limit.get()
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn metrics(&self) -> &LimiterMetrics {
        &self.metrics
    }

    fn idle_after(&self) -> Duration {
        self.window.saturating_mul(self.idle_windows)
    }
}
