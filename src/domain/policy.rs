//! Data-quality policies
//!
//! The source data is not validated when it is written, so a few questionable
//! shapes reach the pipeline. Each policy names what happens when one shows up.

use serde::{Deserialize, Serialize};

/// What to do with a sample that matches no attribute rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptySamplePolicy {
    /// Abort the run
    #[default]
    Fail,
    /// Log, record the sample as skipped and continue
    Skip,
}

/// What to do when one sample carries the same attribute name twice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateAttributePolicy {
    /// The row read last wins
    #[default]
    LastWins,
    /// The row read first wins
    FirstWins,
    /// Abort the run
    Fail,
}

/// What to do when rows of one sample name different patients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatientMismatchPolicy {
    /// Keep the first row's patient and log a warning
    #[default]
    Warn,
    /// Abort the run
    Fail,
}

/// Where sample rows are folded into a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMode {
    /// Stream the rows and fold them in the process
    #[default]
    Client,
    /// Run an aggregation pipeline on the database server
    Server,
}
