//! # Tasklane Worker
//!
//! In-process job queue with a fixed number of workers.
//!
//! Jobs are fire-and-forget: the submitter hands a [`Job`] to the [`Pool`]
//! and never observes its outcome. Failures are logged, counted and handed to
//! the job's optional error sink, and never stop a worker.
//!
//! ## Features
//!
//! - Bounded queue with backpressure (`submit` waits while the queue is full)
//! - Non-blocking and deadline-bounded submission variants
//! - Explicit cancellation passed to every job through [`JobContext`]
//! - Two-phase shutdown: refuse new work, drain for a grace period, then cancel
//!
//! ## Example
//!
//! ```ignore
//! use tasklane_worker::{Job, JobError, Pool, PoolConfig};
//!
//! let pool = Pool::new(PoolConfig::default())?;
//!
//! pool.submit(Job::new("warm-cache", |ctx| async move {
//!     if ctx.is_cancelled() {
//!         return Err(JobError::Cancelled);
//!     }
//!     Ok(())
//! }))
//! .await?;
//!
//! let report = pool.shutdown().await;
//! ```

pub mod error;
pub mod job;
pub mod metrics;
pub mod pool;
mod worker;

// Re-exports
pub use error::{JobError, PoolError};
pub use job::{ErrorSink, Job, JobContext};
pub use metrics::PoolMetrics;
pub use pool::{Pool, PoolConfig, ShutdownReport};
