//! Configuration management for samplecache.
//!
//! TOML configuration with `${VAR_NAME}` substitution, `SAMPLECACHE_*`
//! environment overrides, defaults for optional settings and validation.
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level and dry-run flag
//! - [`MongoDbConfig`] - Source database, collection and aggregation mode
//! - [`RedisConfig`] - Target cache connection
//! - [`PublishConfig`] - Patient filter and data-quality policies
//! - [`LoggingConfig`] - Local file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [mongodb]
//! connection_string = "${SAMPLECACHE_MONGO_URI}"
//! database_name = "biobank"
//! collection = "clinical"
//!
//! [redis]
//! host = "localhost"
//! port = 6379
//!
//! [publish]
//! empty_sample_policy = "fail"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, read_config, read_config_or_default};
pub use schema::{
    ApplicationConfig, LoggingConfig, MongoDbConfig, PublishConfig, RedisConfig,
    SampleCacheConfig,
};
pub use secret::{secret_string, secret_string_opt, SecretString, SecretValue};
