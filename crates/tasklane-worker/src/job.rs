//! Units of deferred work.

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::error::JobError;

/// Callback invoked with the job name and error when a job fails.
pub type ErrorSink = Arc<dyn Fn(&str, &JobError) + Send + Sync>;

type JobFn = Box<dyn FnOnce(JobContext) -> BoxFuture<'static, Result<(), JobError>> + Send>;

/// Execution context handed to a running job.
#[derive(Debug, Clone)]
pub struct JobContext {
    worker_id: usize,
    job_id: u64,
    cancel: CancellationToken,
}

impl JobContext {
    /// Creates a context. Workers build these; tests may too.
    pub fn new(worker_id: usize, job_id: u64, cancel: CancellationToken) -> Self {
        Self {
            worker_id,
            job_id,
            cancel,
        }
    }

    /// Index of the worker running the job.
    pub fn worker_id(&self) -> usize {
        self.worker_id
    }

    /// Sequence number the pool assigned at submission.
    pub fn job_id(&self) -> u64 {
        self.job_id
    }

    /// Returns true once the pool has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Completes when the pool is cancelled.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await
    }

    /// The cancellation token, for handing to nested work.
    pub fn token(&self) -> &CancellationToken {
        &self.cancel
    }
}

/// A named, fire-and-forget unit of work.
///
/// # Examples
///
/// ```
/// use tasklane_worker::{Job, JobError};
///
/// let job = Job::new("cache-delete:task:7", |ctx| async move {
///     if ctx.is_cancelled() {
///         return Err(JobError::Cancelled);
///     }
///     Ok(())
/// });
/// assert_eq!(job.name(), "cache-delete:task:7");
/// ```
pub struct Job {
    pub(crate) id: u64,
    pub(crate) name: Cow<'static, str>,
    task: JobFn,
    pub(crate) on_error: Option<ErrorSink>,
}

impl Job {
    /// Creates a job from an async closure.
    pub fn new<F, Fut>(name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: FnOnce(JobContext) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), JobError>> + Send + 'static,
    {
        Self {
            id: 0,
            name: name.into(),
            task: Box::new(move |ctx| f(ctx).boxed()),
            on_error: None,
        }
    }

    /// Attaches a callback that observes this job's failure.
    pub fn with_error_sink(mut self, sink: ErrorSink) -> Self {
        self.on_error = Some(sink);
        self
    }

    /// Returns the job name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the sequence number, zero until submitted.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Runs the job to completion. A panic becomes `JobError::Panicked`.
    pub(crate) async fn run(self, ctx: JobContext) -> Result<(), JobError> {
        let task = self.task;
        match AssertUnwindSafe(async move { task(ctx).await })
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(payload) => Err(JobError::Panicked(panic_message(&*payload))),
        }
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("has_error_sink", &self.on_error.is_some())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
