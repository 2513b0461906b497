//! Adapter factory
//!
//! Builds the source and cache adapters from configuration. Each is created
//! once per run and shared through an `Arc`.

use crate::adapters::cache::{CacheSink, RedisCacheSink};
use crate::adapters::source::{AttributeSource, MongoAttributeSource};
use crate::config::SampleCacheConfig;
use crate::domain::Result;
use std::sync::Arc;

/// Create the attribute source described by `config.mongodb`
///
/// # Errors
///
/// Returns an error if the client cannot be created
pub async fn create_attribute_source(
    config: &SampleCacheConfig,
) -> Result<Arc<dyn AttributeSource + Send + Sync>> {
    tracing::info!("Creating MongoDB attribute source");
    let source = MongoAttributeSource::new(&config.mongodb).await?;
    Ok(Arc::new(source) as Arc<dyn AttributeSource + Send + Sync>)
}

/// Create the cache sink described by `config.redis`
///
/// # Errors
///
/// Returns an error if the connection cannot be established
pub async fn create_cache_sink(
    config: &SampleCacheConfig,
) -> Result<Arc<dyn CacheSink + Send + Sync>> {
    tracing::info!("Creating Redis cache sink");
    let sink = RedisCacheSink::new(&config.redis).await?;
    Ok(Arc::new(sink) as Arc<dyn CacheSink + Send + Sync>)
}
