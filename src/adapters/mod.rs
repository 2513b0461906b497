//! External system integrations for samplecache.
//!
//! - [`source`] - Where attribute rows are read from (MongoDB, in-memory)
//! - [`cache`] - Where sample documents are written to (Redis, in-memory)
//! - [`factory`] - Builds both from configuration
//!
//! # Design Pattern
//!
//! Adapters isolate the drivers behind the [`AttributeSource`] and
//! [`CacheSink`] traits. The core pipeline only sees the traits, so it runs
//! unchanged against the in-memory implementations in tests.
//!
//! ```rust,no_run
//! use samplecache::adapters::{create_attribute_source, create_cache_sink};
//! use samplecache::config::load_config;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("samplecache.toml")?;
//! let source = create_attribute_source(&config).await?;
//! let cache = create_cache_sink(&config).await?;
//!
//! source.test_connection().await?;
//! cache.test_connection().await?;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod factory;
pub mod source;

pub use cache::{CacheSink, InMemoryCacheSink, RedisCacheSink};
pub use factory::{create_attribute_source, create_cache_sink};
pub use source::{AttributeSource, InMemoryAttributeSource, MongoAttributeSource};
