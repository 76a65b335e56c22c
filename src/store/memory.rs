use crate::core::cache::KeyValueCollection;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory collection; contents are lost when the process exits.
#[derive(Default)]
pub struct MemoryCollection {
    inner: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueCollection for MemoryCollection {
    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        let map = self.inner.lock().await;
        let value = map.get(key).cloned();
        if value.is_some() {
            debug!("Store HIT for key: {}", key);
        } else {
            debug!("Store MISS for key: {}", key);
        }
        value
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut map = self.inner.lock().await;
        debug!("Store PUT for key: {}", key);
        map.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn has(&self, key: &str) -> bool {
        self.inner.lock().await.contains_key(key)
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut map = self.inner.lock().await;
        map.remove(key);
        debug!("Store REMOVE for key: {}", key);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        Ok(self.inner.lock().await.keys().cloned().collect())
    }
}
