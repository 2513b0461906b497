//! Domain error types
//!
//! This module defines the error hierarchy for samplecache. Driver errors from
//! MongoDB and Redis are mapped into these enums so no third-party error type
//! crosses the public API.

use thiserror::Error;

/// Main samplecache error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum SampleCacheError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Source database errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Cache errors
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Sample aggregation errors
    #[error("Aggregation error: {0}")]
    Aggregation(#[from] AggregationError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl SampleCacheError {
    /// Returns true when the error means a backing store could not be reached
    /// or refused our credentials.
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            SampleCacheError::Source(SourceError::ConnectionFailed(_))
                | SampleCacheError::Source(SourceError::AuthenticationFailed(_))
                | SampleCacheError::Cache(CacheError::ConnectionFailed(_))
        )
    }
}

/// Source database errors
///
/// Errors that occur when reading attribute rows from the document database.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Failed to connect to the database
    #[error("Failed to connect to source database: {0}")]
    ConnectionFailed(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// A distinct, find or aggregate query failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A document did not have the expected shape
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),
}

/// Cache errors
///
/// Errors that occur when writing sample documents to the key-value cache.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Failed to connect to the cache
    #[error("Failed to connect to cache: {0}")]
    ConnectionFailed(String),

    /// A SET command failed
    #[error("Failed to write key '{key}': {message}")]
    WriteFailed { key: String, message: String },
}

/// Errors raised while folding attribute rows into one document
#[derive(Debug, Error)]
pub enum AggregationError {
    /// The sample matched no attribute rows
    #[error("Sample '{0}' has no attribute rows")]
    EmptySample(String),

    /// The same attribute name appeared twice and the policy forbids it
    #[error("Sample '{sample}' has duplicate attribute '{name}'")]
    DuplicateAttribute { sample: String, name: String },

    /// Rows of one sample disagree about the owning patient
    #[error("Sample '{sample}' belongs to patient '{expected}' but a row names '{found}'")]
    PatientMismatch {
        sample: String,
        expected: String,
        found: String,
    },
}

// Conversion from std::io::Error
impl From<std::io::Error> for SampleCacheError {
    fn from(err: std::io::Error) -> Self {
        SampleCacheError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for SampleCacheError {
    fn from(err: serde_json::Error) -> Self {
        SampleCacheError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for SampleCacheError {
    fn from(err: toml::de::Error) -> Self {
        SampleCacheError::Configuration(format!("TOML parse error: {err}"))
    }
}
