//! Key-value cache sinks
//!
//! - [`traits`] - The [`CacheSink`] abstraction
//! - [`redis_cache`] - Redis implementation
//! - [`memory`] - In-memory implementation

pub mod memory;
pub mod redis_cache;
pub mod traits;

pub use memory::InMemoryCacheSink;
pub use redis_cache::RedisCacheSink;
pub use traits::CacheSink;
