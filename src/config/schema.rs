//! Configuration schema types
//!
//! This module defines the configuration structure that maps to the TOML file.

use crate::config::secret::{secret_string, SecretString};
use crate::domain::{
    AggregationMode, DuplicateAttributePolicy, EmptySamplePolicy, PatientMismatchPolicy,
};
use serde::{Deserialize, Serialize};

/// Main samplecache configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SampleCacheConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Source MongoDB settings
    #[serde(default)]
    pub mongodb: MongoDbConfig,

    /// Target Redis settings
    #[serde(default)]
    pub redis: RedisConfig,

    /// Publish loop settings
    #[serde(default)]
    pub publish: PublishConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SampleCacheConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.mongodb.validate()?;
        self.redis.validate()?;
        self.publish.validate()?;
        self.logging.validate()?;

        if self.mongodb.aggregation == AggregationMode::Server {
            if self.publish.duplicate_attribute_policy != DuplicateAttributePolicy::LastWins {
                return Err(
                    "mongodb.aggregation = 'server' requires publish.duplicate_attribute_policy = 'last_wins'"
                        .to_string(),
                );
            }
            if self.publish.patient_mismatch_policy != PatientMismatchPolicy::Warn {
                return Err(
                    "mongodb.aggregation = 'server' requires publish.patient_mismatch_policy = 'warn'"
                        .to_string(),
                );
            }
        }

        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (read and aggregate, but don't write to Redis)
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// MongoDB source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoDbConfig {
    /// Connection string (`mongodb://` or `mongodb+srv://`)
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default = "default_empty_secret")]
    pub connection_string: SecretString,

    /// Database holding the attribute collection
    #[serde(default)]
    pub database_name: String,

    /// Collection of attribute rows; also the cache key suffix
    #[serde(default)]
    pub collection: String,

    /// Application name reported to the server
    #[serde(default)]
    pub app_name: Option<String>,

    /// Connect and server selection timeout in seconds
    #[serde(default = "default_connect_timeout_seconds")]
    pub connect_timeout_seconds: u64,

    /// Where rows are folded into documents
    #[serde(default)]
    pub aggregation: AggregationMode,
}

impl MongoDbConfig {
    fn validate(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        let uri = self.connection_string.expose_secret();
        if uri.is_empty() {
            return Err("mongodb.connection_string cannot be empty".to_string());
        }
        if !uri.starts_with("mongodb://") && !uri.starts_with("mongodb+srv://") {
            return Err(
                "mongodb.connection_string must start with mongodb:// or mongodb+srv://"
                    .to_string(),
            );
        }

        if self.database_name.trim().is_empty() {
            return Err("mongodb.database_name cannot be empty".to_string());
        }

        if self.collection.trim().is_empty() {
            return Err("mongodb.collection cannot be empty".to_string());
        }

        if self.connect_timeout_seconds == 0 {
            return Err("mongodb.connect_timeout_seconds must be > 0".to_string());
        }

        Ok(())
    }
}

impl Default for MongoDbConfig {
    fn default() -> Self {
        Self {
            connection_string: default_empty_secret(),
            database_name: String::new(),
            collection: String::new(),
            app_name: None,
            connect_timeout_seconds: default_connect_timeout_seconds(),
            aggregation: AggregationMode::default(),
        }
    }
}

/// Redis target configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Redis host
    #[serde(default = "default_redis_host")]
    pub host: String,

    /// Redis port
    #[serde(default = "default_redis_port")]
    pub port: u16,

    /// ACL username (optional)
    #[serde(default)]
    pub username: Option<String>,

    /// Password (optional)
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub password: Option<SecretString>,

    /// Logical database index
    #[serde(default)]
    pub database: i64,
}

impl RedisConfig {
    fn validate(&self) -> Result<(), String> {
        if self.host.trim().is_empty() {
            return Err("redis.host cannot be empty".to_string());
        }

        if self.port == 0 {
            return Err("redis.port must be > 0".to_string());
        }

        if self.database < 0 {
            return Err("redis.database must be >= 0".to_string());
        }

        Ok(())
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: default_redis_host(),
            port: default_redis_port(),
            username: None,
            password: None,
            database: 0,
        }
    }
}

/// Publish loop configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublishConfig {
    /// Explicit patient list; when empty every distinct patient is published
    #[serde(default)]
    pub patients: Vec<String>,

    /// What to do with samples that have no rows
    #[serde(default)]
    pub empty_sample_policy: EmptySamplePolicy,

    /// What to do with repeated attribute names
    #[serde(default)]
    pub duplicate_attribute_policy: DuplicateAttributePolicy,

    /// What to do when a sample's rows disagree about the patient
    #[serde(default)]
    pub patient_mismatch_policy: PatientMismatchPolicy,
}

impl PublishConfig {
    fn validate(&self) -> Result<(), String> {
        if self.patients.iter().any(|p| p.trim().is_empty()) {
            return Err("publish.patients cannot contain empty IDs".to_string());
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_empty_secret() -> SecretString {
    secret_string(String::new())
}

fn default_connect_timeout_seconds() -> u64 {
    10
}

fn default_redis_host() -> String {
    "localhost".to_string()
}

fn default_redis_port() -> u16 {
    6379
}

fn default_local_path() -> String {
    "/var/log/samplecache".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
