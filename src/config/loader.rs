//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::SampleCacheConfig;
use super::secret::{secret_string, secret_string_opt};
use crate::domain::errors::SampleCacheError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Loads and validates configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into SampleCacheConfig
/// 4. Applies environment variable overrides (SAMPLECACHE_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, a referenced
/// environment variable is missing, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use samplecache::config::loader::load_config;
///
/// let config = load_config("samplecache.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<SampleCacheConfig> {
    let config = read_config(path)?;

    config.validate().map_err(|e| {
        SampleCacheError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Reads a configuration file without validating it
///
/// Performs steps 1 to 4 of [`load_config`]. Callers that layer further
/// overrides on top (the CLI flags) validate once they are done.
pub fn read_config(path: impl AsRef<Path>) -> Result<SampleCacheConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(SampleCacheError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        SampleCacheError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: SampleCacheConfig = toml::from_str(&contents)?;

    apply_env_overrides(&mut config);

    Ok(config)
}

/// Reads a configuration file, or starts from defaults if it does not exist
///
/// Either way the `SAMPLECACHE_*` overrides are applied. The returned flag is
/// true if the file was found.
pub fn read_config_or_default(path: impl AsRef<Path>) -> Result<(SampleCacheConfig, bool)> {
    let path = path.as_ref();
    if path.exists() {
        return Ok((read_config(path)?, true));
    }

    tracing::debug!(path = %path.display(), "Configuration file not found, using defaults");
    let mut config = SampleCacheConfig::default();
    apply_env_overrides(&mut config);
    Ok((config, false))
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("env var pattern is a valid regex")
    })
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = env_var_pattern();
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(SampleCacheError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using SAMPLECACHE_* prefix
///
/// Environment variables follow the pattern: SAMPLECACHE_<SECTION>_<KEY>,
/// for example SAMPLECACHE_MONGODB_COLLECTION or SAMPLECACHE_REDIS_PORT.
/// Values that fail to parse are ignored.
pub(crate) fn apply_env_overrides(config: &mut SampleCacheConfig) {
    // Application overrides
    if let Ok(val) = std::env::var("SAMPLECACHE_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("SAMPLECACHE_APPLICATION_DRY_RUN") {
        config.application.dry_run = val.parse().unwrap_or(false);
    }

    // MongoDB overrides
    if let Ok(val) = std::env::var("SAMPLECACHE_MONGODB_CONNECTION_STRING") {
        config.mongodb.connection_string = secret_string(val);
    }
    if let Ok(val) = std::env::var("SAMPLECACHE_MONGODB_DATABASE_NAME") {
        config.mongodb.database_name = val;
    }
    if let Ok(val) = std::env::var("SAMPLECACHE_MONGODB_COLLECTION") {
        config.mongodb.collection = val;
    }
    if let Ok(val) = std::env::var("SAMPLECACHE_MONGODB_CONNECT_TIMEOUT_SECONDS") {
        if let Ok(timeout) = val.parse() {
            config.mongodb.connect_timeout_seconds = timeout;
        }
    }

    // Redis overrides
    if let Ok(val) = std::env::var("SAMPLECACHE_REDIS_HOST") {
        config.redis.host = val;
    }
    if let Ok(val) = std::env::var("SAMPLECACHE_REDIS_PORT") {
        if let Ok(port) = val.parse() {
            config.redis.port = port;
        }
    }
    if let Ok(val) = std::env::var("SAMPLECACHE_REDIS_USERNAME") {
        config.redis.username = Some(val);
    }
    if let Ok(val) = std::env::var("SAMPLECACHE_REDIS_PASSWORD") {
        config.redis.password = secret_string_opt(Some(val));
    }
    if let Ok(val) = std::env::var("SAMPLECACHE_REDIS_DATABASE") {
        if let Ok(database) = val.parse() {
            config.redis.database = database;
        }
    }

    // Logging overrides
    if let Ok(val) = std::env::var("SAMPLECACHE_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("SAMPLECACHE_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}
