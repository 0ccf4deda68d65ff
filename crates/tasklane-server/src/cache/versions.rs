//! Per-key write versions.

use std::sync::Arc;

use dashmap::DashMap;
use tasklane_core::TaskId;

/// Monotonic version per task id, bumped on every write.
///
/// A populate job records the version it was scheduled under and only keeps
/// its cache write if no write has bumped the version since. Entries are
/// never removed: dropping one would reset the id to version zero and let a
/// populate job scheduled before a delete resurrect the record.
#[derive(Debug, Clone, Default)]
pub struct KeyVersions {
    inner: Arc<DashMap<TaskId, u64>>,
}

impl KeyVersions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current version of `id`; zero if it was never written.
    pub fn current(&self, id: TaskId) -> u64 {
        self.inner.get(&id).map(|v| *v).unwrap_or(0)
    }

    /// Advances the version of `id` and returns the new value.
    pub fn bump(&self, id: TaskId) -> u64 {
        let mut version = self.inner.entry(id).or_insert(0);
        *version += 1;
        *version
    }

    /// Returns true if `id` is still at `version`.
    pub fn is_current(&self, id: TaskId, version: u64) -> bool {
        self.current(id) == version
    }

    /// Number of ids tracked.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
