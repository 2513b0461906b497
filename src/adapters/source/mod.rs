//! Attribute row sources
//!
//! - [`traits`] - The [`AttributeSource`] abstraction
//! - [`mongo`] - MongoDB implementation
//! - [`pipeline`] - Server-side aggregation pipeline
//! - [`memory`] - In-memory implementation

pub mod memory;
pub mod mongo;
pub mod pipeline;
pub mod traits;

pub use memory::InMemoryAttributeSource;
pub use mongo::MongoAttributeSource;
pub use pipeline::sample_pipeline;
pub use traits::AttributeSource;
