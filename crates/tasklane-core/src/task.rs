//! Task record and the payloads that create, change and select it.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier assigned to a task by the durable store.
pub type TaskId = u64;

/// Identifier of the user that owns a task.
pub type UserId = u64;

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    /// Returns the wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relative importance of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    /// Returns the wire name of the priority.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A task as persisted by the durable store.
///
/// This is also the snapshot written to the cache, so its serialized form
/// must stay decodable by every running instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: TaskPriority,
    pub user_id: UserId,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a task. The store assigns id and timestamps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub priority: Option<TaskPriority>,
    pub user_id: UserId,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

impl NewTask {
    /// Creates a payload with the required fields and defaults elsewhere.
    pub fn new(title: impl Into<String>, user_id: UserId) -> Self {
        Self {
            title: title.into(),
            user_id,
            ..Self::default()
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the priority.
    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Sets the status.
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Materializes the record a store persists under `id` at `now`.
    pub fn into_task(self, id: TaskId, now: DateTime<Utc>) -> Task {
        Task {
            id,
            title: self.title,
            description: self.description,
            status: self.status.unwrap_or_default(),
            priority: self.priority.unwrap_or_default(),
            user_id: self.user_id,
            due_date: self.due_date,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of a task.
///
/// Absent fields, and text fields sent as empty strings, leave the current
/// value untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub priority: Option<TaskPriority>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

impl TaskPatch {
    /// Applies the patch in place. Returns true if any field changed.
    pub fn apply(&self, task: &mut Task) -> bool {
        let mut changed = false;

        if let Some(title) = self.title.as_deref().filter(|t| !t.is_empty()) {
            changed |= task.title != title;
            task.title = title.to_string();
        }
        if let Some(description) = self.description.as_deref().filter(|d| !d.is_empty()) {
            changed |= task.description != description;
            task.description = description.to_string();
        }
        if let Some(status) = self.status {
            changed |= task.status != status;
            task.status = status;
        }
        if let Some(priority) = self.priority {
            changed |= task.priority != priority;
            task.priority = priority;
        }
        if let Some(due_date) = self.due_date {
            changed |= task.due_date != Some(due_date);
            task.due_date = Some(due_date);
        }

        changed
    }
}

/// Optional status/priority constraints when listing a user's tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFilter {
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub priority: Option<TaskPriority>,
}

impl TaskFilter {
    /// Returns true if the task satisfies every set constraint.
    pub fn matches(&self, task: &Task) -> bool {
        self.status.is_none_or(|s| s == task.status)
            && self.priority.is_none_or(|p| p == task.priority)
    }
}
