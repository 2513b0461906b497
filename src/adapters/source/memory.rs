//! In-memory attribute source
//!
//! Holds attribute rows per collection behind a `tokio::sync::RwLock`. Rows
//! are returned in insertion order, the same way a collection scan returns
//! documents in natural order.

use super::traits::AttributeSource;
use crate::domain::{AttributeRow, CollectionName, PatientId, Result, SampleId};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

/// [`AttributeSource`] backed by process memory
#[derive(Default)]
pub struct InMemoryAttributeSource {
    collections: RwLock<HashMap<String, Vec<AttributeRow>>>,
}

impl InMemoryAttributeSource {
    /// Creates an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends rows to `collection`
    pub async fn insert_rows(
        &self,
        collection: &CollectionName,
        rows: impl IntoIterator<Item = AttributeRow>,
    ) {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.as_str().to_string())
            .or_default()
            .extend(rows);
    }

    /// Deletes every row of `sample` from `collection`, returning how many
    /// were removed
    pub async fn delete_sample(&self, collection: &CollectionName, sample: &SampleId) -> usize {
        let mut collections = self.collections.write().await;
        match collections.get_mut(collection.as_str()) {
            Some(rows) => {
                let before = rows.len();
                rows.retain(|row| &row.sample != sample);
                before - rows.len()
            }
            None => 0,
        }
    }

    /// Number of rows stored in `collection`
    pub async fn row_count(&self, collection: &CollectionName) -> usize {
        self.collections
            .read()
            .await
            .get(collection.as_str())
            .map_or(0, Vec::len)
    }
}

/// Keeps the first occurrence of every item
fn distinct<T, I>(items: I) -> Vec<T>
where
    T: Clone + Eq + std::hash::Hash,
    I: IntoIterator<Item = T>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

#[async_trait]
impl AttributeSource for InMemoryAttributeSource {
    async fn test_connection(&self) -> Result<()> {
        Ok(())
    }

    async fn distinct_patients(&self, collection: &CollectionName) -> Result<Vec<PatientId>> {
        let collections = self.collections.read().await;
        let rows = collections.get(collection.as_str()).map(Vec::as_slice).unwrap_or_default();
        Ok(distinct(rows.iter().map(|row| row.patient.clone())))
    }

    async fn distinct_samples(
        &self,
        collection: &CollectionName,
        patient: &PatientId,
    ) -> Result<Vec<SampleId>> {
        let collections = self.collections.read().await;
        let rows = collections.get(collection.as_str()).map(Vec::as_slice).unwrap_or_default();
        Ok(distinct(
            rows.iter()
                .filter(|row| &row.patient == patient)
                .map(|row| row.sample.clone()),
        ))
    }

    async fn find_attribute_rows(
        &self,
        collection: &CollectionName,
        sample: &SampleId,
    ) -> Result<Vec<AttributeRow>> {
        let collections = self.collections.read().await;
        let rows = collections.get(collection.as_str()).map(Vec::as_slice).unwrap_or_default();
        Ok(rows
            .iter()
            .filter(|row| &row.sample == sample)
            .cloned()
            .collect())
    }

    fn database_name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(sample: &str, patient: &str, name: &str, value: serde_json::Value) -> AttributeRow {
        AttributeRow::new(
            SampleId::new(sample).unwrap(),
            PatientId::new(patient).unwrap(),
            name,
            value,
        )
    }

    #[tokio::test]
    async fn test_distinct_patients_and_samples() {
        let source = InMemoryAttributeSource::new();
        let coll = CollectionName::new("clinical").unwrap();
        source
            .insert_rows(
                &coll,
                vec![
                    row("S1", "P1", "age", json!(30)),
                    row("S1", "P1", "sex", json!("F")),
                    row("S2", "P2", "age", json!(40)),
                    row("S3", "P2", "age", json!(50)),
                ],
            )
            .await;

        let patients = source.distinct_patients(&coll).await.unwrap();
        assert_eq!(patients.len(), 2);

        let samples = source
            .distinct_samples(&coll, &PatientId::new("P2").unwrap())
            .await
            .unwrap();
        assert_eq!(
            samples,
            vec![SampleId::new("S2").unwrap(), SampleId::new("S3").unwrap()]
        );
    }

    #[tokio::test]
    async fn test_unknown_collection_is_empty() {
        let source = InMemoryAttributeSource::new();
        let coll = CollectionName::new("missing").unwrap();
        assert!(source.distinct_patients(&coll).await.unwrap().is_empty());
        assert_eq!(source.row_count(&coll).await, 0);
    }

    #[tokio::test]
    async fn test_find_rows_preserves_order() {
        let source = InMemoryAttributeSource::new();
        let coll = CollectionName::new("clinical").unwrap();
        source
            .insert_rows(
                &coll,
                vec![
                    row("S1", "P1", "b", json!(1)),
                    row("S2", "P1", "x", json!(0)),
                    row("S1", "P1", "a", json!(2)),
                ],
            )
            .await;

        let rows = source
            .find_attribute_rows(&coll, &SampleId::new("S1").unwrap())
            .await
            .unwrap();
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_delete_sample() {
        let source = InMemoryAttributeSource::new();
        let coll = CollectionName::new("clinical").unwrap();
        source
            .insert_rows(
                &coll,
                vec![
                    row("S1", "P1", "age", json!(30)),
                    row("S2", "P1", "age", json!(31)),
                ],
            )
            .await;

        let removed = source
            .delete_sample(&coll, &SampleId::new("S1").unwrap())
            .await;
        assert_eq!(removed, 1);
        assert_eq!(source.row_count(&coll).await, 1);
    }
}
