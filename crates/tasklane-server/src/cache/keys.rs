//! Cache key generation.

use std::fmt;

use tasklane_core::TaskId;

/// Key de cache para el snapshot de una tarea: `task:<id>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskCacheKey {
    id: TaskId,
}

impl TaskCacheKey {
    /// Prefijo compartido por todas las keys de tareas.
    pub const PREFIX: &'static str = "task";

    /// Crea la key para la tarea `id`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tasklane_server::cache::TaskCacheKey;
    ///
    /// let key = TaskCacheKey::new(42);
    /// assert_eq!(key.to_string(), "task:42");
    /// ```
    pub fn new(id: TaskId) -> Self {
        Self { id }
    }

    /// Retorna el id de la tarea.
    pub fn id(&self) -> TaskId {
        self.id
    }
}

impl fmt::Display for TaskCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", Self::PREFIX, self.id)
    }
}
