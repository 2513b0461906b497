//! Rows to document transformation
//!
//! Folds the narrow attribute rows of one sample into a single wide document.
//! The stages follow the aggregation the data has always been published with:
//!
//! 1. **Match** - keep rows of the requested sample
//! 2. **Group** - collect `(name, value)` pairs in row order, and the owning
//!    patient from the first row
//! 3. **Reshape** - turn the pairs into a map, resolving repeated names with
//!    the [`DuplicateAttributePolicy`]
//! 4. **Merge** - the map's fields become the document's top-level fields
//! 5. **Project** - [`RESERVED_FIELDS`](crate::domain::RESERVED_FIELDS) are
//!    left out
//!
//! This is a pure function. It does no I/O and can be tested without a
//! database.

use crate::config::PublishConfig;
use crate::domain::{
    is_reserved_field, AggregationError, AttributeRow, DuplicateAttributePolicy,
    PatientMismatchPolicy, Result, SampleAttributeDocument, SampleId,
};

/// Policies applied while reshaping
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReshapeOptions {
    /// Repeated attribute names
    pub duplicate_policy: DuplicateAttributePolicy,

    /// Rows naming different patients
    pub patient_mismatch_policy: PatientMismatchPolicy,
}

impl From<&PublishConfig> for ReshapeOptions {
    fn from(config: &PublishConfig) -> Self {
        Self {
            duplicate_policy: config.duplicate_attribute_policy,
            patient_mismatch_policy: config.patient_mismatch_policy,
        }
    }
}

/// Folds the rows of `sample` into its [`SampleAttributeDocument`]
///
/// Rows belonging to other samples are ignored.
///
/// # Errors
///
/// - [`AggregationError::EmptySample`] if no row belongs to `sample`
/// - [`AggregationError::PatientMismatch`] if rows disagree about the patient
///   and the policy is [`PatientMismatchPolicy::Fail`]
/// - [`AggregationError::DuplicateAttribute`] if a name repeats and the
///   policy is [`DuplicateAttributePolicy::Fail`]
///
/// # Examples
///
/// ```
/// use samplecache::core::aggregate::{reshape_rows, ReshapeOptions};
/// use samplecache::domain::{AttributeRow, PatientId, SampleId};
/// use serde_json::json;
///
/// let sample = SampleId::new("S1").unwrap();
/// let patient = PatientId::new("P1").unwrap();
/// let rows = vec![
///     AttributeRow::new(sample.clone(), patient.clone(), "age", json!(42)),
///     AttributeRow::new(sample.clone(), patient.clone(), "sex", json!("F")),
/// ];
///
/// let document = reshape_rows(&sample, rows, &ReshapeOptions::default()).unwrap();
/// assert_eq!(document.to_json_string().unwrap(), r#"{"age":42,"sex":"F"}"#);
/// ```
pub fn reshape_rows(
    sample: &SampleId,
    rows: Vec<AttributeRow>,
    options: &ReshapeOptions,
) -> Result<SampleAttributeDocument> {
    let mut matched = rows.into_iter().filter(|row| &row.sample == sample).peekable();

    let owner = match matched.peek() {
        Some(first) => first.patient.clone(),
        None => return Err(AggregationError::EmptySample(sample.to_string()).into()),
    };

    let mut document = SampleAttributeDocument::new();
    let mut mismatched_rows = 0usize;

    for row in matched {
        if row.patient != owner {
            match options.patient_mismatch_policy {
                PatientMismatchPolicy::Warn => mismatched_rows += 1,
                PatientMismatchPolicy::Fail => {
                    return Err(AggregationError::PatientMismatch {
                        sample: sample.to_string(),
                        expected: owner.to_string(),
                        found: row.patient.to_string(),
                    }
                    .into())
                }
            }
        }

        if is_reserved_field(&row.name) {
            tracing::debug!(
                sample = %sample,
                attribute = %row.name,
                "Dropping attribute with reserved name"
            );
            continue;
        }

        if document.contains_field(&row.name) {
            match options.duplicate_policy {
                DuplicateAttributePolicy::LastWins => {}
                DuplicateAttributePolicy::FirstWins => continue,
                DuplicateAttributePolicy::Fail => {
                    return Err(AggregationError::DuplicateAttribute {
                        sample: sample.to_string(),
                        name: row.name,
                    }
                    .into())
                }
            }
        }

        document.insert(row.name, row.value);
    }

    if mismatched_rows > 0 {
        tracing::warn!(
            sample = %sample,
            patient = %owner,
            mismatched_rows,
            "Sample rows disagree about the patient; keeping the first"
        );
    }

    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PatientId, SampleCacheError};
    use serde_json::{json, Value};
    use test_case::test_case;

    fn row(sample: &str, patient: &str, name: &str, value: Value) -> AttributeRow {
        AttributeRow::new(
            SampleId::new(sample).unwrap(),
            PatientId::new(patient).unwrap(),
            name,
            value,
        )
    }

    fn sample(id: &str) -> SampleId {
        SampleId::new(id).unwrap()
    }

    #[test]
    fn test_flattens_rows() {
        let rows = vec![
            row("S1", "P1", "age", json!(42)),
            row("S1", "P1", "sex", json!("F")),
        ];

        let document = reshape_rows(&sample("S1"), rows, &ReshapeOptions::default()).unwrap();
        let value: Value = serde_json::from_str(&document.to_json_string().unwrap()).unwrap();

        assert_eq!(value, json!({"age": 42, "sex": "F"}));
    }

    #[test]
    fn test_never_contains_bookkeeping_fields() {
        let rows = (0..25)
            .map(|i| row("S1", "P1", &format!("attr_{i}"), json!(i)))
            .collect();

        let document = reshape_rows(&sample("S1"), rows, &ReshapeOptions::default()).unwrap();

        assert_eq!(document.len(), 25);
        for field in ["sample", "patient", "user", "_id"] {
            assert!(!document.contains_field(field));
        }
    }

    #[test_case("sample" ; "sample attribute")]
    #[test_case("patient" ; "patient attribute")]
    #[test_case("user" ; "user attribute")]
    #[test_case("_id" ; "id attribute")]
    #[test_case("data" ; "data attribute")]
    fn test_reserved_attribute_names_are_dropped(name: &str) {
        let rows = vec![
            row("S1", "P1", name, json!("shadow")),
            row("S1", "P1", "age", json!(7)),
        ];

        let document = reshape_rows(&sample("S1"), rows, &ReshapeOptions::default()).unwrap();

        assert!(!document.contains_field(name));
        assert_eq!(document.get("age"), Some(&json!(7)));
    }

    #[test]
    fn test_empty_rows_fail() {
        let err = reshape_rows(&sample("S1"), Vec::new(), &ReshapeOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            SampleCacheError::Aggregation(AggregationError::EmptySample(ref s)) if s == "S1"
        ));
    }

    #[test]
    fn test_rows_of_other_samples_do_not_count() {
        let rows = vec![row("S2", "P1", "age", json!(1))];
        let result = reshape_rows(&sample("S1"), rows, &ReshapeOptions::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_only_reserved_rows_give_empty_document() {
        let rows = vec![row("S1", "P1", "patient", json!("P1"))];
        let document = reshape_rows(&sample("S1"), rows, &ReshapeOptions::default()).unwrap();
        assert!(document.is_empty());
    }

    #[test_case(DuplicateAttributePolicy::LastWins, Some(json!(2)) ; "last wins")]
    #[test_case(DuplicateAttributePolicy::FirstWins, Some(json!(1)) ; "first wins")]
    #[test_case(DuplicateAttributePolicy::Fail, None ; "fail")]
    fn test_duplicate_policy(policy: DuplicateAttributePolicy, expected: Option<Value>) {
        let rows = vec![
            row("S1", "P1", "stage", json!(1)),
            row("S1", "P1", "stage", json!(2)),
        ];
        let options = ReshapeOptions {
            duplicate_policy: policy,
            ..ReshapeOptions::default()
        };

        let result = reshape_rows(&sample("S1"), rows, &options);

        match expected {
            Some(value) => assert_eq!(result.unwrap().get("stage"), Some(&value)),
            None => assert!(matches!(
                result,
                Err(SampleCacheError::Aggregation(
                    AggregationError::DuplicateAttribute { .. }
                ))
            )),
        }
    }

    #[test]
    fn test_patient_mismatch_warn_keeps_going() {
        let rows = vec![
            row("S1", "P1", "age", json!(30)),
            row("S1", "P2", "sex", json!("M")),
        ];

        let document = reshape_rows(&sample("S1"), rows, &ReshapeOptions::default()).unwrap();
        assert_eq!(document.len(), 2);
    }

    #[test]
    fn test_patient_mismatch_fail() {
        let rows = vec![
            row("S1", "P1", "age", json!(30)),
            row("S1", "P2", "sex", json!("M")),
        ];
        let options = ReshapeOptions {
            patient_mismatch_policy: PatientMismatchPolicy::Fail,
            ..ReshapeOptions::default()
        };

        let err = reshape_rows(&sample("S1"), rows, &options).unwrap_err();
        match err {
            SampleCacheError::Aggregation(AggregationError::PatientMismatch {
                expected, found, ..
            }) => {
                assert_eq!(expected, "P1");
                assert_eq!(found, "P2");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_value_types_survive() {
        let rows = vec![
            row("S1", "P1", "smoker", json!(false)),
            row("S1", "P1", "bmi", json!(22.5)),
            row("S1", "P1", "notes", Value::Null),
            row("S1", "P1", "hla", json!(["A*02:01", "B*07:02"])),
        ];

        let document = reshape_rows(&sample("S1"), rows, &ReshapeOptions::default()).unwrap();

        assert_eq!(document.get("smoker"), Some(&json!(false)));
        assert_eq!(document.get("bmi"), Some(&json!(22.5)));
        assert_eq!(document.get("notes"), Some(&Value::Null));
        assert_eq!(document.get("hla"), Some(&json!(["A*02:01", "B*07:02"])));
    }

    #[test]
    fn test_options_from_publish_config() {
        let config = PublishConfig {
            duplicate_attribute_policy: DuplicateAttributePolicy::Fail,
            ..PublishConfig::default()
        };
        let options = ReshapeOptions::from(&config);
        assert_eq!(options.duplicate_policy, DuplicateAttributePolicy::Fail);
        assert_eq!(options.patient_mismatch_policy, PatientMismatchPolicy::Warn);
    }
}
