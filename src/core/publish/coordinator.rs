//! Publish coordinator
//!
//! Wires the configured adapters to a [`Publisher`] and runs it.

use super::publisher::{PublishOptions, Publisher};
use super::summary::PublishSummary;
use crate::adapters::cache::CacheSink;
use crate::adapters::factory::{create_attribute_source, create_cache_sink};
use crate::adapters::source::AttributeSource;
use crate::config::SampleCacheConfig;
use crate::domain::{CollectionName, Result, SampleCacheError};
use std::sync::Arc;
use tokio::sync::watch;

/// Publish coordinator
pub struct PublishCoordinator {
    collection: CollectionName,
    options: PublishOptions,
    source: Arc<dyn AttributeSource + Send + Sync>,
    cache: Arc<dyn CacheSink + Send + Sync>,
    shutdown_signal: watch::Receiver<bool>,
}

impl PublishCoordinator {
    /// Create a coordinator from configuration
    ///
    /// Connects to both MongoDB and Redis and checks that they answer before
    /// returning.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for invalid settings and a source or
    /// cache error if either side cannot be reached.
    pub async fn new(
        config: SampleCacheConfig,
        shutdown_signal: watch::Receiver<bool>,
    ) -> Result<Self> {
        config.validate().map_err(SampleCacheError::Configuration)?;

        let source = create_attribute_source(&config).await?;
        source.test_connection().await?;
        tracing::info!(database = %source.database_name(), "Attribute source reachable");

        let cache = create_cache_sink(&config).await?;
        cache.test_connection().await?;
        tracing::info!("Cache sink reachable");

        Self::with_adapters(&config, source, cache, shutdown_signal)
    }

    /// Create a coordinator around already constructed adapters
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the collection name is blank
    pub fn with_adapters(
        config: &SampleCacheConfig,
        source: Arc<dyn AttributeSource + Send + Sync>,
        cache: Arc<dyn CacheSink + Send + Sync>,
        shutdown_signal: watch::Receiver<bool>,
    ) -> Result<Self> {
        let collection = CollectionName::new(config.mongodb.collection.as_str())
            .map_err(SampleCacheError::Configuration)?;

        Ok(Self {
            collection,
            options: PublishOptions::from_config(config),
            source,
            cache,
            shutdown_signal,
        })
    }

    /// Collection being published
    pub fn collection(&self) -> &CollectionName {
        &self.collection
    }

    /// Execute one publish run and log its summary
    ///
    /// # Errors
    ///
    /// Returns the error that aborted the run
    pub async fn execute(&self) -> Result<PublishSummary> {
        let publisher = Publisher::new(
            self.source.clone(),
            self.cache.clone(),
            self.collection.clone(),
            self.options.clone(),
        )
        .with_shutdown(self.shutdown_signal.clone());

        let summary = publisher.run().await?;
        summary.log_summary();
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::cache::InMemoryCacheSink;
    use crate::adapters::source::InMemoryAttributeSource;

    #[test]
    fn test_blank_collection_is_rejected() {
        let (_tx, rx) = watch::channel(false);
        let config = SampleCacheConfig::default();

        let result = PublishCoordinator::with_adapters(
            &config,
            Arc::new(InMemoryAttributeSource::new()),
            Arc::new(InMemoryCacheSink::new()),
            rx,
        );

        assert!(matches!(result, Err(SampleCacheError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_execute_on_empty_collection() {
        let (_tx, rx) = watch::channel(false);
        let mut config = SampleCacheConfig::default();
        config.mongodb.collection = "clinical".to_string();

        let coordinator = PublishCoordinator::with_adapters(
            &config,
            Arc::new(InMemoryAttributeSource::new()),
            Arc::new(InMemoryCacheSink::new()),
            rx,
        )
        .unwrap();

        let summary = coordinator.execute().await.unwrap();
        assert_eq!(summary.total_patients, 0);
        assert_eq!(summary.published, 0);
        assert_eq!(coordinator.collection().as_str(), "clinical");
    }
}
