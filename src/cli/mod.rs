//! CLI interface and argument parsing

pub mod commands;

use crate::domain::SampleCacheError;
use clap::{Parser, Subcommand};

/// samplecache - publish per-sample attributes from MongoDB to Redis
#[derive(Parser, Debug)]
#[command(name = "samplecache")]
#[command(version, about, long_about = None)]
#[command(author = "samplecache Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "samplecache.toml", env = "SAMPLECACHE_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "SAMPLECACHE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Publish every sample of the collection to Redis
    Publish(commands::publish::PublishArgs),

    /// Print the document of one sample without writing it
    Aggregate(commands::aggregate::AggregateArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

/// Process exit code for an error that ended a command
///
/// 2 for configuration problems, 4 when MongoDB or Redis cannot be reached,
/// 5 for everything else.
pub fn exit_code_for(error: &SampleCacheError) -> i32 {
    match error {
        SampleCacheError::Configuration(_) | SampleCacheError::Validation(_) => 2,
        e if e.is_connection_error() => 4,
        _ => 5,
    }
}
