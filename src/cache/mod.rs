//! Fixture cache abstraction layer
//!
//! Adapters keep their fixture sets in a key-value cache shared across
//! sessions. Production uses an external Redis instance; tests and
//! single-process deployments use a process-local map. Adapters only ever
//! see the trait, so neither branches on the environment.

mod memory;
mod redis_cache;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::Config;
use crate::errors::Result;

pub use memory::MemoryCache;
pub use redis_cache::RedisCache;

/// Key-value cache holding serialized fixture sets
#[async_trait]
pub trait FixtureCache: Send + Sync {
    /// Get the value stored under `key`
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()>;

    /// Evict `key`
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Create a fixture cache based on configuration
pub fn create_cache(config: &Config) -> Result<Arc<dyn FixtureCache>> {
    match config.cache.url.as_deref() {
        Some(url) if !url.is_empty() => Ok(Arc::new(RedisCache::new(url)?)),
        _ => Ok(Arc::new(MemoryCache::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_cache_without_url_is_local() {
        let config = Config::default();
        assert!(create_cache(&config).is_ok());
    }

    #[test]
    fn test_create_cache_rejects_malformed_url() {
        let mut config = Config::default();
        config.cache.url = Some("not a url".to_string());
        assert!(create_cache(&config).is_err());
    }
}
