//! Error types for jobs and the pool.

use std::fmt;

/// Outcome of a job that did not succeed.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    /// The job ran and reported a failure.
    #[error("{0}")]
    Failed(String),

    /// The job observed cancellation and gave up.
    #[error("job cancelled")]
    Cancelled,

    /// The job panicked while running.
    #[error("job panicked: {0}")]
    Panicked(String),
}

impl JobError {
    /// Creates a Failed error from anything displayable.
    pub fn failed(reason: impl fmt::Display) -> Self {
        Self::Failed(reason.to_string())
    }

    /// Returns true if the job stopped because of cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Errors returned to a submitter.
///
/// A full queue is not an error for `submit`, which waits instead. Only the
/// non-blocking and deadline-bounded variants report `Busy`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// The pool is shutting down or has shut down.
    #[error("pool is closed")]
    Closed,

    /// The queue stayed full for the whole allowed wait.
    #[error("pool is busy: queue is full")]
    Busy,

    /// The pool cannot be built with the given configuration.
    #[error("invalid pool configuration: {0}")]
    InvalidConfig(String),
}
