//! Aggregate command implementation
//!
//! Builds the document of a single sample and prints it, together with the
//! key it would be published under. Nothing is written to Redis.

use super::publish::SourceArgs;
use crate::adapters::create_attribute_source;
use crate::cli::exit_code_for;
use crate::config::read_config_or_default;
use crate::core::aggregate::{ReshapeOptions, SampleAggregator};
use crate::domain::{CacheKey, CollectionName, SampleId};
use crate::log_error_with_context;
use clap::Args;

/// Arguments for the aggregate command
#[derive(Args, Debug)]
pub struct AggregateArgs {
    /// Sample to aggregate
    #[arg(long)]
    pub sample: String,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Pretty-print the document
    #[arg(long)]
    pub pretty: bool,
}

impl AggregateArgs {
    /// Execute the aggregate command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let sample = match SampleId::new(self.sample.trim()) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Invalid sample: {e}");
                return Ok(2);
            }
        };

        let (mut config, _) = match read_config_or_default(config_path) {
            Ok(loaded) => loaded,
            Err(e) => {
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };
        self.source.apply(&mut config);

        if let Err(e) = config.validate() {
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        let collection = match CollectionName::new(config.mongodb.collection.as_str()) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Invalid collection: {e}");
                return Ok(2);
            }
        };

        let source = match create_attribute_source(&config).await {
            Ok(s) => s,
            Err(e) => {
                log_error_with_context!(&e, "Failed to create attribute source");
                eprintln!("Failed to connect to MongoDB: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        let aggregator = SampleAggregator::new(source, ReshapeOptions::from(&config.publish));
        let document = match aggregator.aggregate(&collection, &sample).await {
            Ok(d) => d,
            Err(e) => {
                log_error_with_context!(&e, "Failed to aggregate sample");
                eprintln!("Failed to aggregate sample '{sample}': {e}");
                return Ok(exit_code_for(&e));
            }
        };

        let rendered = if self.pretty {
            serde_json::to_string_pretty(&document)?
        } else {
            document.to_json_string()?
        };

        println!("{}", CacheKey::new(&sample, &collection));
        println!("{rendered}");
        Ok(0)
    }
}
