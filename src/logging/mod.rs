//! Logging and observability
//!
//! Structured logging through `tracing`: console output always, plus
//! optional JSON lines in a rolling local file.
//!
//! # Example
//!
//! ```no_run
//! use samplecache::config::LoggingConfig;
//! use samplecache::logging::init_logging;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log that every sample of a patient was handled
///
/// # Example
///
/// ```no_run
/// use samplecache::log_patient_complete;
/// use samplecache::domain::PatientId;
///
/// let patient = PatientId::new("P1").unwrap();
/// log_patient_complete!(&patient, 3);
/// ```
#[macro_export]
macro_rules! log_patient_complete {
    ($patient:expr, $samples:expr) => {
        tracing::debug!(
            patient = %$patient,
            samples = $samples,
            "Patient completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use samplecache::log_error_with_context;
/// use samplecache::domain::SampleCacheError;
///
/// let error = SampleCacheError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
