//! In-memory cache sink

use super::traits::CacheSink;
use crate::domain::{CacheKey, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// [`CacheSink`] backed by a sorted map, with a running write counter
#[derive(Default)]
pub struct InMemoryCacheSink {
    entries: RwLock<BTreeMap<String, String>>,
    writes: AtomicUsize,
}

impl InMemoryCacheSink {
    /// Creates an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads one entry
    pub async fn get(&self, key: &str) -> Option<String> {
        self.entries.read().await.get(key).cloned()
    }

    /// Copies every entry, sorted by key
    pub async fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries.read().await.clone()
    }

    /// Number of distinct keys
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns true if nothing was written yet
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Total `set` calls, overwrites included
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CacheSink for InMemoryCacheSink {
    async fn test_connection(&self) -> Result<()> {
        Ok(())
    }

    async fn set(&self, key: &CacheKey, value: String) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(key.as_str().to_string(), value);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CollectionName, SampleId};

    fn key(sample: &str) -> CacheKey {
        CacheKey::new(
            &SampleId::new(sample).unwrap(),
            &CollectionName::new("coll").unwrap(),
        )
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = InMemoryCacheSink::new();
        assert!(cache.is_empty().await);

        cache.set(&key("S1"), "{}".to_string()).await.unwrap();

        assert_eq!(cache.get("S1-coll").await, Some("{}".to_string()));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let cache = InMemoryCacheSink::new();
        cache.set(&key("S1"), "{\"a\":1}".to_string()).await.unwrap();
        cache.set(&key("S1"), "{\"a\":2}".to_string()).await.unwrap();

        assert_eq!(cache.get("S1-coll").await, Some("{\"a\":2}".to_string()));
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.write_count(), 2);
    }
}
