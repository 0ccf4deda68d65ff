//! Durable store implementations.

pub mod memory;

pub use memory::MemoryTaskStore;
