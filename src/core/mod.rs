//! Core business logic for samplecache.
//!
//! # Modules
//!
//! - [`aggregate`] - Folding attribute rows into one document per sample
//! - [`enumerate`] - Listing the patients a run visits
//! - [`publish`] - The publish loop, its coordinator and summary
//!
//! # Publish Workflow
//!
//! 1. **Enumerate**: Distinct patients of the collection, or the configured list
//! 2. **List samples**: Distinct samples of each patient
//! 3. **Aggregate**: Fold each sample's rows into a flat document
//! 4. **Write**: `SET <sample>-<collection>` with the serialized document
//! 5. **Report**: Log the publish summary
//!
//! # Example
//!
//! ```rust,no_run
//! use samplecache::config::load_config;
//! use samplecache::core::publish::PublishCoordinator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("samplecache.toml")?;
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//! let coordinator = PublishCoordinator::new(config, shutdown_rx).await?;
//! let summary = coordinator.execute().await?;
//!
//! println!("Published: {}", summary.published);
//! println!("Skipped: {}", summary.skipped.len());
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod enumerate;
pub mod publish;
