//! Server-side sample aggregation pipeline
//!
//! Builds the MongoDB pipeline that folds the rows of one sample into a single
//! document: match, group, reshape, merge and project. It mirrors
//! [`reshape_rows`](crate::core::aggregate::reshape_rows) with last-wins
//! duplicates and no patient check.

use crate::domain::SampleId;
use mongodb::bson::{doc, Document};

/// Builds the five-stage aggregation pipeline for `sample`
///
/// The result set is a single document for a sample with rows and empty
/// otherwise.
pub fn sample_pipeline(sample: &SampleId) -> Vec<Document> {
    vec![
        // Match
        doc! {
            "$match": { "sample": sample.as_str() }
        },
        // Group
        doc! {
            "$group": {
                "_id": "$sample",
                "data": { "$push": { "k": "$name", "v": "$value" } },
                "patient": { "$push": "$patient" },
            }
        },
        // Reshape
        doc! {
            "$project": {
                "_id": 0,
                "sample": "$_id",
                "user": { "$arrayElemAt": ["$patient", 0] },
                "data": { "$arrayToObject": "$data" },
            }
        },
        // Merge
        doc! {
            "$replaceRoot": {
                "newRoot": { "$mergeObjects": ["$$ROOT", "$data"] }
            }
        },
        // Project
        doc! {
            "$project": {
                "data": 0,
                "user": 0,
                "sample": 0,
                "patient": 0,
                "_id": 0,
            }
        },
    ]
}
