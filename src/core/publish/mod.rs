//! Publishing sample documents to the cache
//!
//! - [`publisher`] - The sequential patient/sample loop
//! - [`coordinator`] - Builds the adapters from configuration and runs it
//! - [`summary`] - Run outcome and reporting

pub mod coordinator;
pub mod publisher;
pub mod summary;

pub use coordinator::PublishCoordinator;
pub use publisher::{PublishOptions, Publisher};
pub use summary::PublishSummary;
