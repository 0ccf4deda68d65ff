//! Test helpers para tasklane-server.

#![allow(dead_code, unused_imports)]

pub mod app;
pub mod assertions;
pub mod client;
pub mod stores;

pub use app::{TestApp, client, settle};
pub use assertions::*;
pub use client::{TestClient, TestResponse};
pub use stores::{CacheOp, CountingStore, FailingCache, RecordingCache};
