//! Domain models and types for samplecache.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`PatientId`], [`SampleId`], [`CollectionName`])
//! - **Records** ([`AttributeRow`], [`SampleAttributeDocument`], [`CacheKey`])
//! - **Data-quality policies** ([`EmptySamplePolicy`], [`DuplicateAttributePolicy`], ...)
//! - **Error types** ([`SampleCacheError`], [`SourceError`], [`CacheError`], [`AggregationError`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! ```rust
//! use samplecache::domain::{CacheKey, CollectionName, SampleId};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let sample = SampleId::new("S1")?;
//! let collection = CollectionName::new("clinical")?;
//!
//! let key = CacheKey::new(&sample, &collection);
//! assert_eq!(key.as_str(), "S1-clinical");
//! # Ok(())
//! # }
//! ```

pub mod attribute;
pub mod errors;
pub mod ids;
pub mod policy;
pub mod result;

// Re-export commonly used types for convenience
pub use attribute::{
    is_reserved_field, AttributeRow, CacheKey, SampleAttributeDocument, RESERVED_FIELDS,
};
pub use errors::{AggregationError, CacheError, SampleCacheError, SourceError};
pub use ids::{CollectionName, PatientId, SampleId};
pub use policy::{
    AggregationMode, DuplicateAttributePolicy, EmptySamplePolicy, PatientMismatchPolicy,
};
pub use result::Result;
