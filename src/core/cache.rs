//! Key-value persistence abstractions.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;

/// A named bucket of string keys mapped to byte values.
#[async_trait]
pub trait KeyValueCollection: Send + Sync {
    async fn get(&self, key: &str) -> Option<Vec<u8>>;
    async fn put(&self, key: &str, value: &[u8]) -> Result<()>;
    async fn has(&self, key: &str) -> bool;
    async fn remove(&self, key: &str) -> Result<()>;
    async fn keys(&self) -> Result<Vec<String>>;
}

/// Hands out collections by name.
pub trait Store {
    fn get_collection(
        &self,
        name: &str,
        persist: bool,
        create_if_missing: bool,
    ) -> Option<Arc<dyn KeyValueCollection>>;

    fn remove_collection(&self, name: &str) -> bool;
}

/// Reads and decodes a JSON value. `None` when the key is absent.
pub async fn get_json<T: DeserializeOwned>(
    collection: &dyn KeyValueCollection,
    key: &str,
) -> Option<serde_json::Result<T>> {
    let bytes = collection.get(key).await?;
    Some(serde_json::from_slice(&bytes))
}

pub async fn put_json<T: Serialize + ?Sized>(
    collection: &dyn KeyValueCollection,
    key: &str,
    value: &T,
) -> Result<()> {
    let bytes = serde_json::to_vec(value)?;
    collection.put(key, &bytes).await
}
