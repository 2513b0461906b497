//! Per-sample aggregation
//!
//! - [`reshape`] - The pure rows-to-document fold
//! - [`SampleAggregator`] - Runs that fold against an [`AttributeSource`]

pub mod reshape;

pub use reshape::{reshape_rows, ReshapeOptions};

use crate::adapters::source::AttributeSource;
use crate::domain::{CollectionName, Result, SampleAttributeDocument, SampleId};
use std::sync::Arc;

/// Builds the attribute document of one sample
///
/// Whether the fold happens in process or in the database is up to the
/// source; see [`AttributeSource::aggregate_sample`].
pub struct SampleAggregator {
    source: Arc<dyn AttributeSource + Send + Sync>,
    options: ReshapeOptions,
}

impl SampleAggregator {
    /// Create an aggregator reading from `source`
    pub fn new(source: Arc<dyn AttributeSource + Send + Sync>, options: ReshapeOptions) -> Self {
        Self { source, options }
    }

    /// Policies this aggregator applies
    pub fn options(&self) -> &ReshapeOptions {
        &self.options
    }

    /// Aggregate `sample` from `collection`
    ///
    /// # Errors
    ///
    /// Fails on source errors and on the data-quality violations described
    /// in [`reshape_rows`].
    pub async fn aggregate(
        &self,
        collection: &CollectionName,
        sample: &SampleId,
    ) -> Result<SampleAttributeDocument> {
        let document = self
            .source
            .aggregate_sample(collection, sample, &self.options)
            .await?;

        tracing::trace!(
            collection = %collection,
            sample = %sample,
            fields = document.len(),
            "Sample aggregated"
        );

        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::source::InMemoryAttributeSource;
    use crate::domain::{AggregationError, AttributeRow, PatientId, SampleCacheError};
    use serde_json::json;

    async fn seeded() -> (Arc<InMemoryAttributeSource>, CollectionName) {
        let collection = CollectionName::new("clinical").unwrap();
        let source = Arc::new(InMemoryAttributeSource::new());
        let patient = PatientId::new("P1").unwrap();
        let s1 = SampleId::new("S1").unwrap();
        let s2 = SampleId::new("S2").unwrap();

        source
            .insert_rows(
                &collection,
                vec![
                    AttributeRow::new(s1.clone(), patient.clone(), "age", json!(42)),
                    AttributeRow::new(s2.clone(), patient.clone(), "age", json!(43)),
                    AttributeRow::new(s1, patient, "sex", json!("F")),
                ],
            )
            .await;

        (source, collection)
    }

    #[tokio::test]
    async fn test_aggregate_interleaved_rows() {
        let (source, collection) = seeded().await;
        let aggregator = SampleAggregator::new(source, ReshapeOptions::default());

        let document = aggregator
            .aggregate(&collection, &SampleId::new("S1").unwrap())
            .await
            .unwrap();

        assert_eq!(document.to_json_string().unwrap(), r#"{"age":42,"sex":"F"}"#);
    }

    #[tokio::test]
    async fn test_aggregate_unknown_sample() {
        let (source, collection) = seeded().await;
        let aggregator = SampleAggregator::new(source, ReshapeOptions::default());

        let err = aggregator
            .aggregate(&collection, &SampleId::new("S9").unwrap())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SampleCacheError::Aggregation(AggregationError::EmptySample(_))
        ));
    }
}
