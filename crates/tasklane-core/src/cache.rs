//! Cache store trait definition.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::CacheError;

/// An ephemeral key/value store used as a side channel in front of the
/// durable store.
///
/// Values are opaque bytes; encoding is the caller's business. A missing key
/// is `Ok(None)`, not an error. Implementations must tolerate concurrent
/// writers, including ones outside this process.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Stores `value` under `key`, expiring after `ttl`.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError>;

    /// Returns the value under `key`, if present and not expired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Removes `key`. Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Returns the name of this cache, used for logging.
    fn name(&self) -> &str;
}
