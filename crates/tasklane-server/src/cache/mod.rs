//! Cache layer for Tasklane Server.
//!
//! [`MokaCacheStore`] is the in-process [`CacheStore`](tasklane_core::CacheStore)
//! with per-entry TTL. [`KeyVersions`] stamps each key so background
//! population can tell when a write has overtaken it.

pub mod keys;
pub mod store;
pub mod versions;

pub use keys::TaskCacheKey;
pub use store::MokaCacheStore;
pub use versions::KeyVersions;
