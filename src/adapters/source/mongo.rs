//! MongoDB attribute source
//!
//! Reads attribute rows with the official `mongodb` driver. One [`Client`] is
//! created per run and reused for every query.

use super::pipeline::sample_pipeline;
use super::traits::AttributeSource;
use crate::config::MongoDbConfig;
use crate::core::aggregate::{reshape_rows, ReshapeOptions};
use crate::domain::{
    AggregationError, AggregationMode, AttributeRow, CollectionName, PatientId, Result,
    SampleAttributeDocument, SampleCacheError, SampleId, SourceError,
};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::error::{Error as MongoError, ErrorKind};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database};
use secrecy::ExposeSecret;
use std::time::Duration;

/// MongoDB-backed [`AttributeSource`]
pub struct MongoAttributeSource {
    database: Database,

    database_name: String,

    aggregation: AggregationMode,
}

impl MongoAttributeSource {
    /// Create a new MongoDB source
    ///
    /// The driver connects lazily; call
    /// [`test_connection`](AttributeSource::test_connection) to fail fast.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection string cannot be parsed.
    pub async fn new(config: &MongoDbConfig) -> Result<Self> {
        let mut options = ClientOptions::parse(config.connection_string.expose_secret().as_str())
            .await
            .map_err(|e| {
                SampleCacheError::Configuration(format!("Invalid MongoDB connection string: {e}"))
            })?;

        let timeout = Duration::from_secs(config.connect_timeout_seconds);
        options.connect_timeout = Some(timeout);
        options.server_selection_timeout = Some(timeout);
        if let Some(app_name) = &config.app_name {
            options.app_name = Some(app_name.clone());
        }

        let client = Client::with_options(options)
            .map_err(|e| map_mongo_error("create client", e))?;
        let database = client.database(&config.database_name);

        tracing::info!(
            database = %config.database_name,
            aggregation = ?config.aggregation,
            "MongoDB client created"
        );

        Ok(Self {
            database,
            database_name: config.database_name.clone(),
            aggregation: config.aggregation,
        })
    }

    fn collection(&self, collection: &CollectionName) -> Collection<Document> {
        self.database.collection::<Document>(collection.as_str())
    }

    /// Runs [`sample_pipeline`] and takes its single result
    async fn aggregate_server_side(
        &self,
        collection: &CollectionName,
        sample: &SampleId,
    ) -> Result<SampleAttributeDocument> {
        let mut cursor = self
            .collection(collection)
            .aggregate(sample_pipeline(sample))
            .await
            .map_err(|e| map_mongo_error("aggregate", e))?;

        let document = cursor
            .try_next()
            .await
            .map_err(|e| map_mongo_error("aggregate", e))?;

        document_from_aggregate(sample, document)
    }
}

#[async_trait]
impl AttributeSource for MongoAttributeSource {
    async fn test_connection(&self) -> Result<()> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| map_mongo_error("ping", e))?;

        tracing::info!(database = %self.database_name, "MongoDB connection test successful");
        Ok(())
    }

    async fn distinct_patients(&self, collection: &CollectionName) -> Result<Vec<PatientId>> {
        let values = self
            .collection(collection)
            .distinct("patient", doc! {})
            .await
            .map_err(|e| map_mongo_error("distinct patient", e))?;

        values
            .iter()
            .map(|value| bson_string("patient", value).map(PatientId::from_stored))
            .collect()
    }

    async fn distinct_samples(
        &self,
        collection: &CollectionName,
        patient: &PatientId,
    ) -> Result<Vec<SampleId>> {
        let values = self
            .collection(collection)
            .distinct("sample", doc! { "patient": patient.as_str() })
            .await
            .map_err(|e| map_mongo_error("distinct sample", e))?;

        values
            .iter()
            .map(|value| bson_string("sample", value).map(SampleId::from_stored))
            .collect()
    }

    async fn find_attribute_rows(
        &self,
        collection: &CollectionName,
        sample: &SampleId,
    ) -> Result<Vec<AttributeRow>> {
        let mut cursor = self
            .collection(collection)
            .find(doc! { "sample": sample.as_str() })
            .await
            .map_err(|e| map_mongo_error("find", e))?;

        let mut rows = Vec::new();
        while let Some(document) = cursor
            .try_next()
            .await
            .map_err(|e| map_mongo_error("find", e))?
        {
            rows.push(row_from_document(document)?);
        }

        tracing::trace!(
            collection = %collection,
            sample = %sample,
            rows = rows.len(),
            "Fetched attribute rows"
        );

        Ok(rows)
    }

    async fn aggregate_sample(
        &self,
        collection: &CollectionName,
        sample: &SampleId,
        options: &ReshapeOptions,
    ) -> Result<SampleAttributeDocument> {
        match self.aggregation {
            AggregationMode::Client => {
                let rows = self.find_attribute_rows(collection, sample).await?;
                reshape_rows(sample, rows, options)
            }
            AggregationMode::Server => self.aggregate_server_side(collection, sample).await,
        }
    }

    fn database_name(&self) -> &str {
        &self.database_name
    }
}

/// Decodes one stored document into an [`AttributeRow`]
///
/// `sample`, `patient` and `name` must be strings. A missing `value` reads as
/// null.
fn row_from_document(mut document: Document) -> Result<AttributeRow> {
    let field = |document: &Document, name: &str| -> Result<String> {
        document.get_str(name).map(str::to_string).map_err(|e| {
            SourceError::InvalidFormat(format!(
                "attribute row {}: field '{name}': {e}",
                document.get("_id").map(Bson::to_string).unwrap_or_default()
            ))
            .into()
        })
    };

    let sample = SampleId::from_stored(field(&document, "sample")?);
    let patient = PatientId::from_stored(field(&document, "patient")?);
    let name = field(&document, "name")?;
    let value = document
        .remove("value")
        .unwrap_or(Bson::Null)
        .into_relaxed_extjson();

    Ok(AttributeRow::new(sample, patient, name, value))
}

/// Turns the single result of [`sample_pipeline`] into a document
///
/// No result means the sample has no rows. Values use relaxed extended JSON,
/// so numbers stay plain JSON numbers.
fn document_from_aggregate(
    sample: &SampleId,
    document: Option<Document>,
) -> Result<SampleAttributeDocument> {
    let document = document.ok_or_else(|| AggregationError::EmptySample(sample.to_string()))?;

    SampleAttributeDocument::from_json_object(Bson::Document(document).into_relaxed_extjson())
        .ok_or_else(|| {
            SourceError::InvalidFormat(format!(
                "aggregation for sample '{sample}' did not return an object"
            ))
            .into()
        })
}

fn bson_string(field: &str, value: &Bson) -> Result<String> {
    match value {
        Bson::String(s) => Ok(s.clone()),
        other => Err(SourceError::InvalidFormat(format!(
            "distinct '{field}' returned non-string value {other}"
        ))
        .into()),
    }
}

fn map_mongo_error(operation: &str, err: MongoError) -> SourceError {
    match err.kind.as_ref() {
        ErrorKind::Authentication { .. } => SourceError::AuthenticationFailed(err.to_string()),
        ErrorKind::ServerSelection { .. } | ErrorKind::DnsResolve { .. } | ErrorKind::Io(_) => {
            SourceError::ConnectionFailed(format!("{operation}: {err}"))
        }
        _ => SourceError::QueryFailed(format!("{operation}: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_row_from_document() {
        let row = row_from_document(doc! {
            "_id": 1,
            "sample": "S1",
            "patient": "P1",
            "name": "age",
            "value": 42,
        })
        .unwrap();

        assert_eq!(row.sample.as_str(), "S1");
        assert_eq!(row.patient.as_str(), "P1");
        assert_eq!(row.name, "age");
        assert_eq!(row.value, json!(42));
    }

    #[test]
    fn test_row_from_document_missing_value_is_null() {
        let row = row_from_document(doc! {
            "sample": "S1",
            "patient": "P1",
            "name": "consent",
        })
        .unwrap();

        assert_eq!(row.value, serde_json::Value::Null);
    }

    #[test]
    fn test_row_from_document_nested_value() {
        let row = row_from_document(doc! {
            "sample": "S1",
            "patient": "P1",
            "name": "variants",
            "value": { "gene": "TP53", "vaf": 0.31 },
        })
        .unwrap();

        assert_eq!(row.value, json!({ "gene": "TP53", "vaf": 0.31 }));
    }

    #[test]
    fn test_row_from_document_missing_name() {
        let err = row_from_document(doc! {
            "sample": "S1",
            "patient": "P1",
            "value": 1,
        })
        .unwrap_err();

        assert!(matches!(
            err,
            SampleCacheError::Source(SourceError::InvalidFormat(_))
        ));
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn test_row_from_document_numeric_sample() {
        let err = row_from_document(doc! {
            "sample": 17,
            "patient": "P1",
            "name": "age",
            "value": 1,
        })
        .unwrap_err();

        assert!(err.to_string().contains("sample"));
    }

    #[test]
    fn test_row_from_document_blank_ids_are_kept() {
        let row = row_from_document(doc! {
            "sample": "",
            "patient": " ",
            "name": "age",
            "value": 1,
        })
        .unwrap();

        assert_eq!(row.sample.as_str(), "");
        assert_eq!(row.patient.as_str(), " ");
    }

    #[test]
    fn test_distinct_blank_values_become_ids() {
        let patient = bson_string("patient", &Bson::String(String::new()))
            .map(PatientId::from_stored)
            .unwrap();
        let sample = bson_string("sample", &Bson::String("  ".into()))
            .map(SampleId::from_stored)
            .unwrap();

        assert_eq!(patient.as_str(), "");
        assert_eq!(sample.as_str(), "  ");
    }

    #[test]
    fn test_document_from_aggregate() {
        let sample = SampleId::new("S1").unwrap();
        let result = doc! {
            "age": 42_i64,
            "sex": "F",
            "bmi": 22.5,
            "smoker": false,
            "panel": { "genes": ["BRCA1", "TP53"], "depth": 30_i32 },
            "comment": Bson::Null,
        };

        let document = document_from_aggregate(&sample, Some(result)).unwrap();

        assert_eq!(
            document.to_json_string().unwrap(),
            r#"{"age":42,"bmi":22.5,"comment":null,"panel":{"depth":30,"genes":["BRCA1","TP53"]},"sex":"F","smoker":false}"#
        );
    }

    #[test]
    fn test_document_from_aggregate_drops_leftover_fields() {
        let sample = SampleId::new("S1").unwrap();
        let result = doc! { "age": 1, "data": { "age": 1 }, "user": "P1" };

        let document = document_from_aggregate(&sample, Some(result)).unwrap();

        assert_eq!(document.len(), 1);
        assert_eq!(document.get("age"), Some(&json!(1)));
    }

    #[test]
    fn test_document_from_aggregate_without_result() {
        let sample = SampleId::new("S9").unwrap();

        let err = document_from_aggregate(&sample, None).unwrap_err();

        assert!(matches!(
            err,
            SampleCacheError::Aggregation(AggregationError::EmptySample(ref s)) if s == "S9"
        ));
    }

    #[test]
    fn test_bson_string() {
        assert_eq!(bson_string("patient", &Bson::String("P1".into())).unwrap(), "P1");
        assert!(bson_string("patient", &Bson::Int32(3)).is_err());
    }
}
