//! Durable store trait definition.

use async_trait::async_trait;

use crate::error::Result;
use crate::task::{NewTask, Task, TaskFilter, TaskId, UserId};

/// The source of truth for task records.
///
/// Every operation is strongly consistent: once a call returns `Ok`, any
/// later call observes its effect. Callers await these operations on the
/// request path and propagate their errors unchanged.
///
/// # Errors
///
/// - `StoreError::NotFound` when the id does not exist
/// - `StoreError::Invalid` when a record violates a store constraint
/// - `StoreError::Backend` when the backend cannot serve the call
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Persists a new task and returns it with id and timestamps assigned.
    async fn create(&self, task: NewTask) -> Result<Task>;

    /// Fetches a task by id.
    async fn get_by_id(&self, id: TaskId) -> Result<Task>;

    /// Replaces the stored task with the same id.
    async fn update(&self, task: &Task) -> Result<()>;

    /// Removes a task.
    async fn delete(&self, id: TaskId) -> Result<()>;

    /// Lists the tasks of a user that match the filter, ordered by id.
    async fn list_by_user(&self, user_id: UserId, filter: &TaskFilter) -> Result<Vec<Task>>;

    /// Returns the name of this store, used for logging.
    fn name(&self) -> &str;
}
