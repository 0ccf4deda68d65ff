//! Cache-aside access to tasks.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tasklane_core::{
    CacheStore, NewTask, StoreError, Task, TaskFilter, TaskId, TaskPatch, TaskStore, UserId,
};
use tasklane_worker::{ErrorSink, Job, JobError, Pool};
use tracing::{debug, warn};

use crate::cache::{KeyVersions, TaskCacheKey};

/// Default lifetime of a cached task snapshot.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Reads and writes tasks through the durable store, keeping a cache in
/// front of single-task reads.
///
/// The store is the source of truth; every store error reaches the caller.
/// Cache traffic never blocks a request on the cache itself: reads fall back
/// to the store when the cache fails, and every cache write or delete runs as
/// a job on the worker pool. Only the enqueue can wait, when the pool queue
/// is full.
///
/// Writes bump the key's version before scheduling the invalidation. A
/// populate job only keeps its value if the version it captured before
/// reading the store is still current once the write lands, so a slow
/// populate can never leave a value older than an acknowledged write in the
/// cache for longer than it takes that job to finish.
#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn TaskStore>,
    cache: Arc<dyn CacheStore>,
    pool: Arc<Pool>,
    versions: KeyVersions,
    ttl: Duration,
    error_sink: Option<ErrorSink>,
}

impl TaskService {
    pub fn new(
        store: Arc<dyn TaskStore>,
        cache: Arc<dyn CacheStore>,
        pool: Arc<Pool>,
        ttl: Duration,
    ) -> Self {
        Self {
            store,
            cache,
            pool,
            versions: KeyVersions::new(),
            ttl,
            error_sink: None,
        }
    }

    /// Hands failures of cache jobs to `sink` in addition to logging them.
    pub fn with_job_error_sink(mut self, sink: ErrorSink) -> Self {
        self.error_sink = Some(sink);
        self
    }

    /// Persists a new task and schedules caching it.
    pub async fn create(&self, task: NewTask) -> Result<Task, StoreError> {
        let task = self.store.create(task).await?;
        // A fresh id has never been written, so any later write outranks this.
        self.schedule_populate(&task, 0).await;
        Ok(task)
    }

    /// Returns a task, from the cache when possible.
    ///
    /// On a miss the store answers and a populate job is scheduled; the
    /// response does not wait for it.
    pub async fn get_by_id(&self, id: TaskId) -> Result<Task, StoreError> {
        let key = TaskCacheKey::new(id);
        if let Some(task) = self.cached(&key).await {
            return Ok(task);
        }

        let version = self.versions.current(id);
        let task = self.store.get_by_id(id).await?;
        self.schedule_populate(&task, version).await;
        Ok(task)
    }

    /// Applies `patch` to a stored task and schedules invalidating its cache
    /// entry. Returns the updated task.
    pub async fn update(&self, id: TaskId, patch: &TaskPatch) -> Result<Task, StoreError> {
        let mut task = self.store.get_by_id(id).await?;
        patch.apply(&mut task);
        task.updated_at = Utc::now();

        self.store.update(&task).await?;
        self.schedule_invalidate(id).await;
        Ok(task)
    }

    /// Removes a task and schedules invalidating its cache entry.
    pub async fn delete(&self, id: TaskId) -> Result<(), StoreError> {
        self.store.delete(id).await?;
        self.schedule_invalidate(id).await;
        Ok(())
    }

    /// Lists a user's tasks straight from the store. Lists are never cached.
    pub async fn list(
        &self,
        user_id: UserId,
        filter: &TaskFilter,
    ) -> Result<Vec<Task>, StoreError> {
        self.store.list_by_user(user_id, filter).await
    }

    /// Returns the pool running the cache jobs.
    pub fn pool(&self) -> &Arc<Pool> {
        &self.pool
    }

    /// Name of the backing store.
    pub fn store_name(&self) -> &str {
        self.store.name()
    }

    /// Name of the cache.
    pub fn cache_name(&self) -> &str {
        self.cache.name()
    }

    async fn cached(&self, key: &TaskCacheKey) -> Option<Task> {
        let bytes = match self.cache.get(&key.to_string()).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                warn!(
                    cache = self.cache.name(),
                    key = %key,
                    error = %e,
                    "Cache read failed, falling back to store"
                );
                return None;
            },
        };

        match serde_json::from_slice(&bytes) {
            Ok(task) => Some(task),
            Err(e) => {
                debug!(key = %key, error = %e, "Undecodable cache entry treated as a miss");
                None
            },
        }
    }

    async fn schedule_populate(&self, task: &Task, version: u64) {
        let key = TaskCacheKey::new(task.id);
        let bytes = match serde_json::to_vec(task) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(key = %key, error = %e, "Could not encode task for cache");
                return;
            },
        };

        let cache = Arc::clone(&self.cache);
        let versions = self.versions.clone();
        let ttl = self.ttl;

        let job = Job::new(format!("cache-set:{key}"), move |ctx| async move {
            if ctx.is_cancelled() {
                return Err(JobError::Cancelled);
            }
            if !versions.is_current(key.id(), version) {
                debug!(key = %key, version, "Skipping stale cache population");
                return Ok(());
            }

            let name = key.to_string();
            cache
                .set(&name, bytes, ttl)
                .await
                .map_err(|e| JobError::failed(format!("set {name}: {e}")))?;

            // A write that landed during the set has already queued its
            // delete, which may have run first.
            if !versions.is_current(key.id(), version) {
                cache
                    .delete(&name)
                    .await
                    .map_err(|e| JobError::failed(format!("delete {name}: {e}")))?;
            }
            Ok(())
        });

        self.submit(job).await;
    }

    async fn schedule_invalidate(&self, id: TaskId) {
        self.versions.bump(id);

        let key = TaskCacheKey::new(id);
        let cache = Arc::clone(&self.cache);

        let job = Job::new(format!("cache-delete:{key}"), move |_ctx| async move {
            let name = key.to_string();
            cache
                .delete(&name)
                .await
                .map_err(|e| JobError::failed(format!("delete {name}: {e}")))
        });

        self.submit(job).await;
    }

    async fn submit(&self, job: Job) {
        let job = match &self.error_sink {
            Some(sink) => job.with_error_sink(Arc::clone(sink)),
            None => job,
        };
        let name = job.name().to_string();

        if let Err(e) = self.pool.submit(job).await {
            warn!(job = %name, error = %e, "Cache job not scheduled");
        }
    }
}
