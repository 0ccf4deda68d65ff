//! Application state.

use crate::service::TaskService;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    tasks: TaskService,
}

impl AppState {
    /// Creates a new AppState around the task service.
    pub fn new(tasks: TaskService) -> Self {
        Self { tasks }
    }

    /// Returns the task service.
    pub fn tasks(&self) -> &TaskService {
        &self.tasks
    }
}
