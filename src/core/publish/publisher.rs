//! The publish loop
//!
//! For every patient, for every sample of that patient: aggregate the sample,
//! serialize it and write it under `<sample>-<collection>`. The loop is
//! strictly sequential. Each write is independent, so a failure part way
//! through leaves the documents already written in place.

use super::summary::PublishSummary;
use crate::adapters::cache::CacheSink;
use crate::adapters::source::AttributeSource;
use crate::config::SampleCacheConfig;
use crate::core::aggregate::{ReshapeOptions, SampleAggregator};
use crate::core::enumerate::PatientEnumerator;
use crate::domain::{
    AggregationError, CacheKey, CollectionName, EmptySamplePolicy, PatientId, Result,
    SampleCacheError,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Run options for a [`Publisher`]
#[derive(Debug, Clone, Default)]
pub struct PublishOptions {
    /// Aggregate and serialize, but never write to the cache
    pub dry_run: bool,

    /// What to do with samples that have no rows
    pub empty_sample_policy: EmptySamplePolicy,

    /// Explicit patients to publish; empty means all
    pub patients: Vec<String>,

    /// Policies passed to the aggregator
    pub reshape: ReshapeOptions,
}

impl PublishOptions {
    /// Collect the run options from a loaded configuration
    pub fn from_config(config: &SampleCacheConfig) -> Self {
        Self {
            dry_run: config.application.dry_run,
            empty_sample_policy: config.publish.empty_sample_policy,
            patients: config.publish.patients.clone(),
            reshape: ReshapeOptions::from(&config.publish),
        }
    }
}

/// Publishes every sample of one collection to the cache
pub struct Publisher {
    source: Arc<dyn AttributeSource + Send + Sync>,
    cache: Arc<dyn CacheSink + Send + Sync>,
    collection: CollectionName,
    options: PublishOptions,
    shutdown: Option<watch::Receiver<bool>>,
}

impl Publisher {
    /// Create a publisher for `collection`
    pub fn new(
        source: Arc<dyn AttributeSource + Send + Sync>,
        cache: Arc<dyn CacheSink + Send + Sync>,
        collection: CollectionName,
        options: PublishOptions,
    ) -> Self {
        Self {
            source,
            cache,
            collection,
            options,
            shutdown: None,
        }
    }

    /// Stop between patients once `shutdown` turns true
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Run options in use
    pub fn options(&self) -> &PublishOptions {
        &self.options
    }

    /// Run the publish loop once
    ///
    /// # Errors
    ///
    /// Any source, aggregation, serialization or cache error aborts the run.
    /// Empty samples abort it too unless the policy is
    /// [`EmptySamplePolicy::Skip`].
    pub async fn run(&self) -> Result<PublishSummary> {
        let start_time = Instant::now();
        let mut summary = PublishSummary::new(self.options.dry_run);

        let enumerator =
            PatientEnumerator::with_patients(self.source.clone(), &self.options.patients)?;
        let patients = enumerator.enumerate(&self.collection).await?;
        let aggregator = SampleAggregator::new(self.source.clone(), self.options.reshape);

        tracing::info!(
            database = %self.source.database_name(),
            collection = %self.collection,
            patients = patients.total(),
            dry_run = self.options.dry_run,
            "Starting publish"
        );

        for patient in patients {
            if self.shutdown_requested() {
                tracing::warn!(
                    visited = summary.total_patients,
                    "Shutdown requested, stopping before next patient"
                );
                summary.interrupted = true;
                break;
            }

            let sample_count = match self.publish_patient(&aggregator, &patient, &mut summary).await
            {
                Ok(count) => count,
                Err(e) => {
                    tracing::error!(
                        patient = %patient,
                        published = summary.published,
                        error = %e,
                        "Publish aborted"
                    );
                    return Err(e);
                }
            };

            summary.total_patients += 1;
            crate::log_patient_complete!(&patient, sample_count);
        }

        Ok(summary.with_duration(start_time.elapsed()))
    }

    /// Publish the samples of one patient, returning how many were visited
    async fn publish_patient(
        &self,
        aggregator: &SampleAggregator,
        patient: &PatientId,
        summary: &mut PublishSummary,
    ) -> Result<usize> {
        let samples = self
            .source
            .distinct_samples(&self.collection, patient)
            .await?;

        for sample in &samples {
            summary.total_samples += 1;

            let document = match aggregator.aggregate(&self.collection, sample).await {
                Ok(document) => document,
                Err(SampleCacheError::Aggregation(AggregationError::EmptySample(_)))
                    if self.options.empty_sample_policy == EmptySamplePolicy::Skip =>
                {
                    tracing::warn!(
                        patient = %patient,
                        sample = %sample,
                        "Skipping sample without attribute rows"
                    );
                    summary.add_skipped(sample.clone());
                    continue;
                }
                Err(e) => return Err(e),
            };

            let key = CacheKey::new(sample, &self.collection);
            let payload = document.to_json_string()?;

            if self.options.dry_run {
                tracing::debug!(
                    key = %key,
                    bytes = payload.len(),
                    "Dry run, not writing"
                );
            } else {
                self.cache.set(&key, payload).await?;
                tracing::trace!(key = %key, "Sample written");
            }

            summary.published += 1;
        }

        Ok(samples.len())
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown
            .as_ref()
            .is_some_and(|shutdown| *shutdown.borrow())
    }
}
