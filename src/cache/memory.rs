//! Process-local fixture cache

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::cache::FixtureCache;
use crate::errors::Result;

/// In-memory cache, one map per process
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every entry
    pub async fn flush(&self) {
        self.entries.write().await.clear();
    }
}

#[async_trait]
impl FixtureCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_delete() {
        let cache = MemoryCache::new();
        assert_eq!(cache.get("azure_compute").await.unwrap(), None);

        cache.set("azure_compute", b"[]".to_vec()).await.unwrap();
        assert_eq!(cache.get("azure_compute").await.unwrap(), Some(b"[]".to_vec()));
        assert_eq!(cache.get("msazure_compute").await.unwrap(), None);

        cache.delete("azure_compute").await.unwrap();
        assert_eq!(cache.get("azure_compute").await.unwrap(), None);
    }

    #[test]
    fn test_flush() {
        tokio_test::block_on(async {
            let cache = MemoryCache::new();
            cache.set("a", vec![1]).await.unwrap();
            cache.set("b", vec![2]).await.unwrap();
            cache.flush().await;
            assert_eq!(cache.get("a").await.unwrap(), None);
            assert_eq!(cache.get("b").await.unwrap(), None);
        });
    }
}
