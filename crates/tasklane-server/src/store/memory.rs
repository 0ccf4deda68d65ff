//! In-memory task store.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use tasklane_core::{NewTask, Result, StoreError, Task, TaskFilter, TaskId, TaskStore, UserId};
use tracing::debug;

/// Task store kept in process memory.
///
/// Ids are assigned from a counter and never reused, including after a
/// delete. Listing returns tasks in id order.
#[derive(Debug)]
pub struct MemoryTaskStore {
    tasks: RwLock<BTreeMap<TaskId, Task>>,
    next_id: AtomicU64,
}

impl Default for MemoryTaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self {
            tasks: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Creates a store holding `tasks` as-is. New ids continue after the
    /// highest seeded id.
    pub fn with_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let tasks: BTreeMap<TaskId, Task> = tasks.into_iter().map(|t| (t.id, t)).collect();
        let next_id = tasks.keys().next_back().map_or(1, |id| id + 1);

        Self {
            tasks: RwLock::new(tasks),
            next_id: AtomicU64::new(next_id),
        }
    }

    /// Number of stored tasks.
    pub fn len(&self) -> usize {
        self.tasks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.read().is_empty()
    }

    fn validate_title(title: &str) -> Result<()> {
        if title.trim().is_empty() {
            return Err(StoreError::invalid("title", "must not be empty"));
        }
        Ok(())
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn create(&self, task: NewTask) -> Result<Task> {
        Self::validate_title(&task.title)?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let task = task.into_task(id, Utc::now());
        self.tasks.write().insert(id, task.clone());

        debug!(task_id = id, user_id = task.user_id, "Task created");
        Ok(task)
    }

    async fn get_by_id(&self, id: TaskId) -> Result<Task> {
        self.tasks
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(id))
    }

    async fn update(&self, task: &Task) -> Result<()> {
        Self::validate_title(&task.title)?;

        let mut tasks = self.tasks.write();
        let stored = tasks
            .get_mut(&task.id)
            .ok_or_else(|| StoreError::not_found(task.id))?;
        *stored = task.clone();
        Ok(())
    }

    async fn delete(&self, id: TaskId) -> Result<()> {
        self.tasks
            .write()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(id))
    }

    async fn list_by_user(&self, user_id: UserId, filter: &TaskFilter) -> Result<Vec<Task>> {
        Ok(self
            .tasks
            .read()
            .values()
            .filter(|t| t.user_id == user_id && filter.matches(t))
            .cloned()
            .collect())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
