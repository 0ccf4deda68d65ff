//! Tasklane Core - Domain types and collaborator traits
//!
//! This crate provides the foundational types shared by the worker pool and
//! the server: the task record, the durable store and cache store contracts,
//! and the error hierarchy they report through.

pub mod cache;
pub mod error;
pub mod store;
pub mod task;

pub use cache::CacheStore;
pub use error::{CacheError, Result, StoreError};
pub use store::TaskStore;
pub use task::{NewTask, Task, TaskFilter, TaskId, TaskPatch, TaskPriority, TaskStatus, UserId};
