//! Attribute source abstraction
//!
//! The pipeline only needs three read capabilities from the document
//! database: distinct patients, distinct samples of one patient, and the rows
//! of one sample. Everything else is built on top of those.

use crate::core::aggregate::{reshape_rows, ReshapeOptions};
use crate::domain::{
    AttributeRow, CollectionName, PatientId, Result, SampleAttributeDocument, SampleId,
};
use async_trait::async_trait;

/// Read-only access to attribute rows
#[async_trait]
pub trait AttributeSource: Send + Sync {
    /// Test the database connection
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be reached or rejects the
    /// credentials.
    async fn test_connection(&self) -> Result<()>;

    /// Distinct `patient` values in `collection`
    ///
    /// No ordering is guaranteed.
    async fn distinct_patients(&self, collection: &CollectionName) -> Result<Vec<PatientId>>;

    /// Distinct `sample` values among rows whose `patient` is `patient`
    async fn distinct_samples(
        &self,
        collection: &CollectionName,
        patient: &PatientId,
    ) -> Result<Vec<SampleId>>;

    /// All rows whose `sample` is `sample`, in natural order
    async fn find_attribute_rows(
        &self,
        collection: &CollectionName,
        sample: &SampleId,
    ) -> Result<Vec<AttributeRow>>;

    /// Folds the rows of one sample into its document
    ///
    /// The default implementation reads the rows with
    /// [`find_attribute_rows`](Self::find_attribute_rows) and reshapes them in
    /// process. Sources that can aggregate server side may override it.
    ///
    /// # Errors
    ///
    /// Returns [`AggregationError::EmptySample`](crate::domain::AggregationError::EmptySample)
    /// if no row matches `sample`.
    async fn aggregate_sample(
        &self,
        collection: &CollectionName,
        sample: &SampleId,
        options: &ReshapeOptions,
    ) -> Result<SampleAttributeDocument> {
        let rows = self.find_attribute_rows(collection, sample).await?;
        reshape_rows(sample, rows, options)
    }

    /// Name of the backing database, for logging
    fn database_name(&self) -> &str;
}
