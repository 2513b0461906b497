//! Init command implementation
//!
//! Writes a starter configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

const MINIMAL_CONFIG: &str = r#"# samplecache configuration

[application]
log_level = "info"
dry_run = false

[mongodb]
connection_string = "${SAMPLECACHE_MONGO_URI}"
database_name = "biobank"
collection = "clinical"

[redis]
host = "localhost"
port = 6379

[publish]
empty_sample_policy = "fail"

[logging]
local_enabled = false
"#;

const COMMENTED_CONFIG: &str = r#"# samplecache configuration
#
# ${VAR_NAME} placeholders are replaced from the environment when the file is
# loaded. Any setting can also be overridden with SAMPLECACHE_<SECTION>_<KEY>,
# for example SAMPLECACHE_REDIS_HOST.

[application]
# trace, debug, info, warn or error
log_level = "info"

# Aggregate every sample but never write to Redis
dry_run = false

[mongodb]
# mongodb:// or mongodb+srv:// URI; keep credentials in the environment
connection_string = "${SAMPLECACHE_MONGO_URI}"
database_name = "biobank"

# Collection of (sample, patient, name, value) rows. Also the suffix of every
# cache key: <sample>-<collection>
collection = "clinical"

# app_name = "samplecache"
connect_timeout_seconds = 10

# client: stream rows and fold them here (supports every policy below)
# server: run an aggregation pipeline in MongoDB (last_wins + warn only)
aggregation = "client"

[redis]
host = "localhost"
port = 6379
database = 0
# username = "samplecache"
# password = "${SAMPLECACHE_REDIS_PASSWORD}"

[publish]
# Publish only these patients; empty means every patient in the collection
patients = []

# fail: abort the run / skip: log it, list it in the summary, continue
empty_sample_policy = "fail"

# last_wins, first_wins or fail
duplicate_attribute_policy = "last_wins"

# warn: keep the first row's patient / fail: abort the run
patient_mismatch_policy = "warn"

[logging]
# JSON lines in a rolling file, in addition to console output
local_enabled = false
local_path = "/var/log/samplecache"

# daily, hourly or never
local_rotation = "daily"
"#;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "samplecache.toml")]
    pub output: String,

    /// Include every option with comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        if Path::new(&self.output).exists() && !self.force {
            println!("Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        let contents = if self.with_examples {
            COMMENTED_CONFIG
        } else {
            MINIMAL_CONFIG
        };

        match fs::write(&self.output, contents) {
            Ok(()) => {
                println!("Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Export SAMPLECACHE_MONGO_URI (or put it in a .env file)");
                println!("  3. Validate configuration: samplecache validate-config");
                println!("  4. Try one sample: samplecache aggregate --sample <id>");
                println!("  5. Publish: samplecache publish");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }
}
