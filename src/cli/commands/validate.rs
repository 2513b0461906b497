//! Validate config command implementation

use crate::config::{load_config, SampleCacheConfig};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("Validating configuration file: {config_path}");
        println!();

        match load_config(config_path) {
            Ok(config) => {
                println!("Configuration is valid");
                println!();
                print_config_summary(&config);
                Ok(0)
            }
            Err(e) => {
                println!("Configuration is invalid");
                println!("   Error: {e}");
                println!();
                Ok(2)
            }
        }
    }
}

fn print_config_summary(config: &SampleCacheConfig) {
    println!("Configuration Summary:");
    println!("  Log Level: {}", config.application.log_level);
    println!("  Dry Run: {}", config.application.dry_run);
    println!("  MongoDB Database: {}", config.mongodb.database_name);
    println!("  Collection: {}", config.mongodb.collection);
    println!("  Aggregation: {:?}", config.mongodb.aggregation);
    println!(
        "  Redis: {}:{}/{}",
        config.redis.host, config.redis.port, config.redis.database
    );
    println!(
        "  Patients: {}",
        if config.publish.patients.is_empty() {
            "All".to_string()
        } else {
            config.publish.patients.join(", ")
        }
    );
    println!(
        "  Policies: empty_sample={:?}, duplicate_attribute={:?}, patient_mismatch={:?}",
        config.publish.empty_sample_policy,
        config.publish.duplicate_attribute_policy,
        config.publish.patient_mismatch_policy
    );
    println!();
}
