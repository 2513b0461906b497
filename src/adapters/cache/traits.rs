//! Cache sink abstraction

use crate::domain::{CacheKey, Result};
use async_trait::async_trait;

/// Write side of the key-value cache
///
/// Writes are plain last-write-wins overwrites without expiry.
#[async_trait]
pub trait CacheSink: Send + Sync {
    /// Test the cache connection
    ///
    /// # Errors
    ///
    /// Returns an error if the cache cannot be reached.
    async fn test_connection(&self) -> Result<()>;

    /// Stores `value` under `key`, replacing any previous value
    async fn set(&self, key: &CacheKey, value: String) -> Result<()>;
}
