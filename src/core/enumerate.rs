//! Patient enumeration
//!
//! Produces the finite set of patients a publish run visits, either from the
//! distinct `patient` values of the collection or from an explicit list.

use crate::adapters::source::AttributeSource;
use crate::domain::{CollectionName, PatientId, Result, SampleCacheError};
use std::collections::HashSet;
use std::sync::Arc;

/// Single-pass cursor over the patients of one run
#[derive(Debug, Clone, Default)]
pub struct PatientCursor {
    patients: std::vec::IntoIter<PatientId>,
    total: usize,
}

impl PatientCursor {
    /// Wrap an already materialized patient list
    pub fn new(patients: Vec<PatientId>) -> Self {
        let total = patients.len();
        Self {
            patients: patients.into_iter(),
            total,
        }
    }

    /// Number of patients the cursor started with
    pub fn total(&self) -> usize {
        self.total
    }
}

impl Iterator for PatientCursor {
    type Item = PatientId;

    fn next(&mut self) -> Option<Self::Item> {
        self.patients.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.patients.size_hint()
    }
}

impl ExactSizeIterator for PatientCursor {}

/// Lists the patients of a collection
pub struct PatientEnumerator {
    source: Arc<dyn AttributeSource + Send + Sync>,
    explicit: Option<Vec<PatientId>>,
}

impl PatientEnumerator {
    /// Enumerate every distinct patient of the collection
    pub fn new(source: Arc<dyn AttributeSource + Send + Sync>) -> Self {
        Self {
            source,
            explicit: None,
        }
    }

    /// Enumerate only `patients`, in the given order
    ///
    /// Repeated IDs are visited once. An empty list falls back to the
    /// distinct query.
    ///
    /// # Errors
    ///
    /// Returns a validation error if any ID is blank
    pub fn with_patients(
        source: Arc<dyn AttributeSource + Send + Sync>,
        patients: &[String],
    ) -> Result<Self> {
        if patients.is_empty() {
            return Ok(Self::new(source));
        }

        let mut seen = HashSet::new();
        let mut explicit = Vec::with_capacity(patients.len());
        for raw in patients {
            let id = PatientId::new(raw.trim()).map_err(SampleCacheError::Validation)?;
            if seen.insert(id.clone()) {
                explicit.push(id);
            }
        }

        Ok(Self {
            source,
            explicit: Some(explicit),
        })
    }

    /// Returns true if an explicit patient list is in use
    pub fn is_explicit(&self) -> bool {
        self.explicit.is_some()
    }

    /// Open a cursor over the patients of `collection`
    ///
    /// # Errors
    ///
    /// Returns an error if the distinct query fails
    pub async fn enumerate(&self, collection: &CollectionName) -> Result<PatientCursor> {
        let patients = match &self.explicit {
            Some(patients) => patients.clone(),
            None => self.source.distinct_patients(collection).await?,
        };

        tracing::info!(
            collection = %collection,
            patients = patients.len(),
            explicit = self.is_explicit(),
            "Enumerated patients"
        );

        Ok(PatientCursor::new(patients))
    }
}
