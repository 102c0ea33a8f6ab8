// # Memory Blob Store
//
// In-memory implementation of BlobStore.
//
// ## Purpose
//
// Holds uploaded objects in a HashMap for tests and ephemeral deployments.
// Public URLs use the `memory://` scheme; they identify the object but are
// not fetchable outside the process.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use async_trait::async_trait;

use crate::Error;
use crate::config::BlobStoreConfig;
use crate::traits::blob_store::{BlobStore, BlobStoreFactory};

/// In-memory blob store implementation
#[derive(Debug, Clone)]
pub struct MemoryBlobStore {
    inner: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryBlobStore {
    /// Create a new empty memory blob store
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get the number of stored objects
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Get a stored object's bytes (test helper)
    pub async fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.inner.read().await.get(key).cloned()
    }
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put_object(&self, key: &str, bytes: &[u8]) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn public_url(&self, key: &str) -> Result<String, Error> {
        let guard = self.inner.read().await;
        if !guard.contains_key(key) {
            return Err(Error::not_found(format!("no object at key {:?}", key)));
        }
        Ok(format!("memory://{}", key))
    }

    fn store_name(&self) -> &'static str {
        "memory"
    }
}

/// Factory for [`MemoryBlobStore`]
pub struct MemoryBlobStoreFactory;

#[async_trait]
impl BlobStoreFactory for MemoryBlobStoreFactory {
    async fn create(&self, config: &BlobStoreConfig) -> Result<Box<dyn BlobStore>, Error> {
        match config {
            BlobStoreConfig::Memory => Ok(Box::new(MemoryBlobStore::new())),
            other => Err(Error::config(format!(
                "memory factory cannot build blob store type {:?}",
                other.type_name()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_blob_store_basic() {
        let store = MemoryBlobStore::new();
        assert!(store.is_empty().await);

        store.put_object("images/eggs.jpg", &[1, 2, 3]).await.unwrap();
        assert_eq!(store.len().await, 1);

        let url = store.public_url("images/eggs.jpg").await.unwrap();
        assert_eq!(url, "memory://images/eggs.jpg");

        // Overwrite at the same key
        store.put_object("images/eggs.jpg", &[4, 5]).await.unwrap();
        assert_eq!(store.len().await, 1);
        assert_eq!(store.object("images/eggs.jpg").await, Some(vec![4, 5]));
    }

    #[tokio::test]
    async fn test_memory_blob_store_missing_object() {
        let store = MemoryBlobStore::new();
        let err = store.public_url("images/nothing.jpg").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
