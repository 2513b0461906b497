//! Redis cache sink
//!
//! Uses one multiplexed connection for the whole run. Every write is a plain
//! `SET` with no expiry.

use super::traits::CacheSink;
use crate::config::RedisConfig;
use crate::domain::{CacheError, CacheKey, Result, SampleCacheError};
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, RedisError};
use secrecy::ExposeSecret;
use url::Url;

/// Redis-backed [`CacheSink`]
pub struct RedisCacheSink {
    connection: MultiplexedConnection,
    endpoint: String,
}

impl RedisCacheSink {
    /// Connect to Redis
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be built or the connection fails.
    pub async fn new(config: &RedisConfig) -> Result<Self> {
        let url = connection_url(config)?;
        let client = redis::Client::open(url.as_str())
            .map_err(|e| SampleCacheError::Configuration(format!("Invalid Redis URL: {e}")))?;

        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| CacheError::ConnectionFailed(e.to_string()))?;

        let endpoint = format!("{}:{}/{}", config.host, config.port, config.database);
        tracing::info!(endpoint = %endpoint, "Redis connection established");

        Ok(Self {
            connection,
            endpoint,
        })
    }

    /// `host:port/db` of the connected server
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CacheSink for RedisCacheSink {
    async fn test_connection(&self) -> Result<()> {
        let mut connection = self.connection.clone();
        let _: () = redis::cmd("PING")
            .query_async(&mut connection)
            .await
            .map_err(|e| CacheError::ConnectionFailed(e.to_string()))?;

        tracing::info!(endpoint = %self.endpoint, "Redis connection test successful");
        Ok(())
    }

    async fn set(&self, key: &CacheKey, value: String) -> Result<()> {
        let mut connection = self.connection.clone();
        let _: () = connection
            .set(key.as_str(), value)
            .await
            .map_err(|e| map_redis_error(key, e))?;
        Ok(())
    }
}

/// Builds `redis://[user][:password@]host:port/db` with credentials escaped
pub(crate) fn connection_url(config: &RedisConfig) -> Result<Url> {
    let host = if config.host.contains(':') && !config.host.starts_with('[') {
        format!("[{}]", config.host)
    } else {
        config.host.clone()
    };
    let mut url = Url::parse(&format!("redis://{host}:{}", config.port))
        .map_err(|e| SampleCacheError::Configuration(format!("Invalid Redis host: {e}")))?;
    url.set_path(&config.database.to_string());

    if let Some(username) = &config.username {
        url.set_username(username).map_err(|_| {
            SampleCacheError::Configuration("Redis username cannot be set on this URL".to_string())
        })?;
    }
    if let Some(password) = &config.password {
        url.set_password(Some(password.expose_secret().as_str()))
            .map_err(|_| {
                SampleCacheError::Configuration(
                    "Redis password cannot be set on this URL".to_string(),
                )
            })?;
    }

    Ok(url)
}

fn map_redis_error(key: &CacheKey, err: RedisError) -> CacheError {
    if err.is_connection_refusal() || err.is_connection_dropped() || err.is_io_error() {
        CacheError::ConnectionFailed(err.to_string())
    } else {
        CacheError::WriteFailed {
            key: key.to_string(),
            message: err.to_string(),
        }
    }
}
