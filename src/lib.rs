// samplecache - MongoDB to Redis sample attribute publisher
// Copyright (c) 2025 samplecache Contributors
// Licensed under the MIT License

//! # samplecache - MongoDB to Redis sample attribute publisher
//!
//! Clinical and biobank attributes are stored in MongoDB as narrow rows, one
//! `(sample, patient, name, value)` document per attribute. samplecache
//! folds the rows of every sample into one flat JSON object and writes it to
//! Redis under `<sample>-<collection>`, so readers get a sample's whole
//! attribute set with a single `GET`.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Aggregation, patient enumeration and the publish loop
//! - [`adapters`] - MongoDB source, Redis sink and in-memory doubles
//! - [`domain`] - Identifiers, records, policies and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use samplecache::config::load_config;
//! use samplecache::core::publish::PublishCoordinator;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("samplecache.toml")?;
//!     let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//!     let coordinator = PublishCoordinator::new(config, shutdown_rx).await?;
//!     let summary = coordinator.execute().await?;
//!
//!     println!("Published {} samples", summary.published);
//!     Ok(())
//! }
//! ```
//!
//! ## Reshaping
//!
//! Rows become fields; bookkeeping columns never reach the document:
//!
//! ```rust
//! use samplecache::core::aggregate::{reshape_rows, ReshapeOptions};
//! use samplecache::domain::{AttributeRow, PatientId, SampleId};
//! use serde_json::json;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let sample = SampleId::new("S1")?;
//! let patient = PatientId::new("P1")?;
//! let rows = vec![
//!     AttributeRow::new(sample.clone(), patient.clone(), "age", json!(42)),
//!     AttributeRow::new(sample.clone(), patient, "sex", json!("F")),
//! ];
//!
//! let document = reshape_rows(&sample, rows, &ReshapeOptions::default())?;
//! assert_eq!(document.to_json_string()?, r#"{"age":42,"sex":"F"}"#);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Every fallible operation returns [`domain::Result`], whose error is
//! [`domain::SampleCacheError`]. Driver errors are mapped at the adapter
//! boundary.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
