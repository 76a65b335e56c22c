use crate::core::cache::KeyValueCollection;
use anyhow::{Context, Result};
use async_trait::async_trait;
use fjall::{Keyspace, PartitionHandle, PersistMode};
use std::sync::Arc;
use tracing::debug;

/// Collection backed by one `fjall` partition.
pub struct DiskCollection {
    keyspace: Arc<Keyspace>,
    partition: PartitionHandle,
}

impl DiskCollection {
    pub fn new(keyspace: Arc<Keyspace>, partition: PartitionHandle) -> Self {
        DiskCollection {
            keyspace,
            partition,
        }
    }
}

#[async_trait]
impl KeyValueCollection for DiskCollection {
    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        match self.partition.get(key.as_bytes()) {
            Ok(Some(value)) => {
                debug!("Store HIT for key: {}", key);
                Some(value.to_vec())
            }
            Ok(None) => {
                debug!("Store MISS for key: {}", key);
                None
            }
            Err(e) => {
                debug!("DiskCollection get error for key {}: {}", key, e);
                None
            }
        }
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        self.partition
            .insert(key.as_bytes(), value)
            .with_context(|| format!("Failed to write key: {key}"))?;
        self.keyspace
            .persist(PersistMode::SyncAll)
            .context("Failed to persist keyspace")?;
        debug!("Store PUT for key: {}", key);
        Ok(())
    }

    async fn has(&self, key: &str) -> bool {
        self.partition.contains_key(key.as_bytes()).unwrap_or(false)
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.partition
            .remove(key.as_bytes())
            .with_context(|| format!("Failed to remove key: {key}"))?;
        self.keyspace
            .persist(PersistMode::SyncAll)
            .context("Failed to persist keyspace")?;
        debug!("Store REMOVE for key: {}", key);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        self.partition
            .keys()
            .map(|key| {
                key.map(|k| String::from_utf8_lossy(&k).into_owned())
                    .map_err(anyhow::Error::from)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fjall::PartitionCreateOptions;
    use tempfile::tempdir;

    fn open(path: &std::path::Path) -> DiskCollection {
        let keyspace = Arc::new(fjall::Config::new(path).open().unwrap());
        let partition = keyspace
            .open_partition("test", PartitionCreateOptions::default())
            .unwrap();
        DiskCollection::new(keyspace, partition)
    }

    #[tokio::test]
    async fn test_disk_get_put() {
        let dir = tempdir().unwrap();
        let collection = open(dir.path());

        assert!(collection.get("key1").await.is_none());

        collection.put("key1", b"123").await.unwrap();

        assert_eq!(collection.get("key1").await, Some(b"123".to_vec()));
        assert!(collection.has("key1").await);
        assert!(!collection.has("key2").await);
    }

    #[tokio::test]
    async fn test_disk_remove_and_keys() {
        let dir = tempdir().unwrap();
        let collection = open(dir.path());

        collection.put("a", b"1").await.unwrap();
        collection.put("b", b"2").await.unwrap();
        assert_eq!(collection.keys().await.unwrap(), vec!["a", "b"]);

        collection.remove("a").await.unwrap();
        assert_eq!(collection.keys().await.unwrap(), vec!["b"]);
    }
}
