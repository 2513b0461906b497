//! Publish command implementation
//!
//! Runs one full pass over the configured collection and writes every
//! sample document to Redis.

use crate::cli::exit_code_for;
use crate::config::{read_config_or_default, secret_string, SampleCacheConfig};
use crate::core::publish::{PublishCoordinator, PublishSummary};
use crate::log_error_with_context;
use clap::Args;
use tokio::sync::watch;

/// Source overrides shared by commands that read from MongoDB
#[derive(Args, Debug, Default, Clone)]
pub struct SourceArgs {
    /// Override the MongoDB connection URI
    #[arg(long, value_name = "URI")]
    pub mongo_uri: Option<String>,

    /// Override the MongoDB database name
    #[arg(long)]
    pub db_name: Option<String>,

    /// Override the attribute collection
    #[arg(long)]
    pub collection: Option<String>,
}

impl SourceArgs {
    /// Apply the overrides that were given
    pub fn apply(&self, config: &mut SampleCacheConfig) {
        if let Some(uri) = &self.mongo_uri {
            tracing::info!("Overriding MongoDB connection string from CLI");
            config.mongodb.connection_string = secret_string(uri.clone());
        }
        if let Some(db_name) = &self.db_name {
            tracing::info!(database = %db_name, "Overriding MongoDB database from CLI");
            config.mongodb.database_name = db_name.clone();
        }
        if let Some(collection) = &self.collection {
            tracing::info!(collection = %collection, "Overriding collection from CLI");
            config.mongodb.collection = collection.clone();
        }
    }
}

/// Arguments for the publish command
#[derive(Args, Debug, Default)]
pub struct PublishArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Override the Redis host
    #[arg(long)]
    pub redis_host: Option<String>,

    /// Override the Redis port
    #[arg(long)]
    pub redis_port: Option<u16>,

    /// Publish only these patients (comma-separated)
    #[arg(long, value_name = "IDS")]
    pub patient: Option<String>,

    /// Aggregate every sample but do not write to Redis
    #[arg(long)]
    pub dry_run: bool,
}

impl PublishArgs {
    /// Apply the CLI overrides on top of the loaded configuration
    pub fn apply_overrides(&self, config: &mut SampleCacheConfig) {
        self.source.apply(config);

        if let Some(host) = &self.redis_host {
            tracing::info!(host = %host, "Overriding Redis host from CLI");
            config.redis.host = host.clone();
        }
        if let Some(port) = self.redis_port {
            tracing::info!(port, "Overriding Redis port from CLI");
            config.redis.port = port;
        }
        if let Some(patients) = &self.patient {
            let ids: Vec<String> = patients
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            tracing::info!(patients = ?ids, "Overriding patient list from CLI");
            config.publish.patients = ids;
        }
        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }
    }

    /// Execute the publish command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting publish command");

        let (mut config, found) = match read_config_or_default(config_path) {
            Ok(loaded) => loaded,
            Err(e) => {
                log_error_with_context!(&e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };
        if !found {
            tracing::warn!(
                config_path = %config_path,
                "Configuration file not found, using defaults and overrides"
            );
        }

        self.apply_overrides(&mut config);

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        if config.application.dry_run {
            println!("DRY RUN MODE - nothing will be written to Redis");
            println!();
        }

        let coordinator = match PublishCoordinator::new(config, shutdown_signal).await {
            Ok(c) => c,
            Err(e) => {
                log_error_with_context!(&e, "Failed to initialize publish");
                eprintln!("Failed to initialize publish: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        println!("Publishing collection '{}'...", coordinator.collection());

        let summary = match coordinator.execute().await {
            Ok(s) => s,
            Err(e) => {
                log_error_with_context!(&e, "Publish aborted");
                eprintln!("Publish aborted: {e}");
                eprintln!("Samples written before the failure remain in Redis.");
                return Ok(exit_code_for(&e));
            }
        };

        print_summary(&summary);

        if summary.interrupted {
            println!("Publish interrupted. Run the same command again to publish everything.");
            tracing::info!("Publish interrupted by user signal");
            Ok(130)
        } else {
            println!("Publish completed successfully");
            Ok(0)
        }
    }
}

fn print_summary(summary: &PublishSummary) {
    println!();
    println!("Publish Summary:");
    println!("  Patients: {}", summary.total_patients);
    println!("  Samples: {}", summary.total_samples);
    if summary.dry_run {
        println!("  Published (dry run): {}", summary.published);
    } else {
        println!("  Published: {}", summary.published);
    }
    println!("  Skipped: {}", summary.skipped.len());
    for sample in summary.skipped.iter().take(10) {
        println!("    - {sample}");
    }
    if summary.skipped.len() > 10 {
        println!("    ... and {} more", summary.skipped.len() - 10);
    }
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!();
}
