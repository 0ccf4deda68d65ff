//! Application services.

pub mod tasks;

pub use tasks::TaskService;
