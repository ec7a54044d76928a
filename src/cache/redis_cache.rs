//! Redis-backed fixture cache
//!
//! Shared by every server process pointing at the same instance. Keys are
//! used verbatim (`<provider>_<kind>`), values are serialized fixture sets.

use async_trait::async_trait;
use redis::AsyncCommands;

use crate::cache::FixtureCache;
use crate::errors::Result;

/// External cache client
#[derive(Clone)]
pub struct RedisCache {
    client: redis::Client,
}

impl RedisCache {
    /// Create a client for `url`; connections are opened per call
    pub fn new(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        Ok(Self { client })
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }
}

#[async_trait]
impl FixtureCache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.connection().await?;
        let value: Option<Vec<u8>> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let mut conn = self.connection().await?;
        conn.set::<_, _, ()>(key, value).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(key).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::BackendError;

    #[test]
    fn test_client_creation_does_not_connect() {
        assert!(RedisCache::new("redis://127.0.0.1:1/").is_ok());
        assert!(matches!(
            RedisCache::new("http://127.0.0.1/"),
            Err(BackendError::Cache(_))
        ));
    }
}
