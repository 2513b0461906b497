//! Attribute rows, sample documents and cache keys
//!
//! An [`AttributeRow`] is one narrow `(sample, name, value)` record as stored in
//! the source collection. Many rows fold into one [`SampleAttributeDocument`],
//! which is published under a [`CacheKey`].

use super::ids::{CollectionName, PatientId, SampleId};
use crate::domain::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Field names that never appear in a published document.
///
/// `sample` and `patient` are row bookkeeping, `user` is the name the patient
/// carries while a sample is being grouped, `data` holds the grouped
/// attributes before they are merged, and `_id` is the database key.
pub const RESERVED_FIELDS: [&str; 5] = ["_id", "sample", "patient", "user", "data"];

/// Returns true if `name` is one of [`RESERVED_FIELDS`]
pub fn is_reserved_field(name: &str) -> bool {
    RESERVED_FIELDS.contains(&name)
}

/// One attribute of one sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeRow {
    /// Sample the attribute belongs to
    pub sample: SampleId,

    /// Owning patient, repeated on every row of the sample
    pub patient: PatientId,

    /// Attribute name
    pub name: String,

    /// Attribute value (any scalar or nested JSON value)
    pub value: Value,
}

impl AttributeRow {
    /// Creates a new attribute row
    pub fn new(sample: SampleId, patient: PatientId, name: impl Into<String>, value: Value) -> Self {
        Self {
            sample,
            patient,
            name: name.into(),
            value,
        }
    }
}

/// Flattened attribute set of one sample
///
/// Fields are kept sorted by name, so serializing the same document twice
/// always yields the same bytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SampleAttributeDocument {
    fields: BTreeMap<String, Value>,
}

impl SampleAttributeDocument {
    /// Creates an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a document from a JSON object, dropping reserved fields.
    ///
    /// Returns `None` if `value` is not an object.
    pub fn from_json_object(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(
                map.into_iter()
                    .filter(|(name, _)| !is_reserved_field(name))
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Inserts a field, returning the previous value under that name
    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.insert(name.into(), value)
    }

    /// Gets a field value
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Returns true if the document has a field called `name`
    pub fn contains_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the document has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over fields in name order
    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    /// Serializes the document to the text stored in the cache
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.fields)?)
    }
}

impl FromIterator<(String, Value)> for SampleAttributeDocument {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Cache key of a published sample: `"{sample}-{collection}"`
///
/// No escaping is applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Builds the key for `sample` read from `collection`
    pub fn new(sample: &SampleId, collection: &CollectionName) -> Self {
        Self(format!("{}-{}", sample.as_str(), collection.as_str()))
    }

    /// Returns the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
