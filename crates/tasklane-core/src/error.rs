//! Error types for Tasklane.
//!
//! Two families of failures cross the collaborator boundary:
//!
//! - [`StoreError`]: the durable store failed. These are propagated
//!   synchronously to whoever issued the request.
//! - [`CacheError`]: the cache store failed. These never reach a caller;
//!   the cache-aside layer treats them as a miss or as a failed background job.
//!
//! # Example
//!
//! ```
//! use tasklane_core::{Result, StoreError};
//!
//! fn find(id: u64) -> Result<String> {
//!     if id == 0 {
//!         return Err(StoreError::not_found(id));
//!     }
//!     Ok(format!("task {}", id))
//! }
//!
//! assert!(find(0).unwrap_err().is_not_found());
//! ```

use thiserror::Error;

use crate::task::TaskId;

/// Failure reported by a durable store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record exists for the requested id.
    #[error("task {id} not found")]
    NotFound {
        /// Id that was requested
        id: TaskId,
    },

    /// The record violates a store constraint.
    #[error("invalid field '{field}': {message}")]
    Invalid {
        /// Field that failed validation
        field: String,
        /// Why it was rejected
        message: String,
    },

    /// The backend itself failed (connection, query, I/O).
    #[error("store '{store}' failed: {message}")]
    Backend {
        /// Name of the store that failed
        store: String,
        /// Description of what went wrong
        message: String,
        /// Underlying error
        #[source]
        cause: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl StoreError {
    /// Creates a NotFound error.
    pub fn not_found(id: TaskId) -> Self {
        Self::NotFound { id }
    }

    /// Creates an Invalid error.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a Backend error without a cause.
    pub fn backend(store: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Backend {
            store: store.into(),
            message: message.into(),
            cause: None,
        }
    }

    /// Creates a Backend error with a cause.
    pub fn backend_with_cause<E>(
        store: impl Into<String>,
        message: impl Into<String>,
        cause: E,
    ) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend {
            store: store.into(),
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }

    /// Returns true if the record does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true if the record was rejected by validation.
    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid { .. })
    }
}

/// Failure reported by a cache store or while encoding cache values.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache backend could not serve the operation.
    #[error("cache unavailable: {reason}")]
    Unavailable {
        /// Description of the failure
        reason: String,
    },

    /// A value could not be encoded into or decoded from its cached form.
    #[error("cache codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

impl CacheError {
    /// Creates an Unavailable error.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }
}

/// Type alias for Results with StoreError.
pub type Result<T> = std::result::Result<T, StoreError>;
