//! Per-client request rate limiting.

pub mod sliding_window;
pub mod sweeper;

pub use sliding_window::SlidingWindowLimiter;
pub use sweeper::{LimiterSweeper, SweepHandle};
