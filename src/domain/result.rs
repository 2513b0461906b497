//! Result type alias for samplecache

use super::errors::SampleCacheError;

/// Result type alias for samplecache operations
///
/// # Examples
///
/// ```
/// use samplecache::domain::result::Result;
/// use samplecache::domain::errors::SampleCacheError;
///
/// fn failing_function() -> Result<()> {
///     Err(SampleCacheError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, SampleCacheError>;
