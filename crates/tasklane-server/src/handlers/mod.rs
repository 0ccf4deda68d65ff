//! HTTP handlers.

pub mod health;
pub mod metrics;
pub mod tasks;
