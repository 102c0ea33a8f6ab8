// # Memory Document Store
//
// In-memory implementation of DocumentStore.
//
// ## Purpose
//
// Provides a simple, fast document store that doesn't persist across
// restarts. Useful for testing, demos, or ephemeral deployments where the
// inventory does not need to outlive the process.
//
// ## Crash Behavior
//
// - All documents are lost on restart/crash
// - No recovery possible (state is in-memory only)
//
// ## When to Use
//
// - Testing environments
// - Trying the engine without a cloud project

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use async_trait::async_trait;

use crate::Error;
use crate::config::DocumentStoreConfig;
use crate::item::{DocumentPatch, ItemDocument};
use crate::traits::document_store::{DocumentStore, DocumentStoreFactory};

/// In-memory document store implementation
///
/// Documents live in a HashMap protected by a RwLock. No persistence.
///
/// # Example
///
/// ```rust,no_run
/// use pantry_core::store::MemoryDocumentStore;
/// use pantry_core::{DocumentStore, DocumentPatch};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryDocumentStore::new();
///
///     // Create a document
///     store.set_merge("eggs", &DocumentPatch::quantity(1)).await?;
///
///     // Read it back
///     let doc = store.get("eggs").await?;
///     assert_eq!(doc.unwrap().quantity, 1);
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MemoryDocumentStore {
    inner: Arc<RwLock<HashMap<String, ItemDocument>>>,
}

impl MemoryDocumentStore {
    /// Create a new empty memory document store
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get the number of documents in the store
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Clear all documents from the store
    pub async fn clear(&self) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.clear();
        Ok(())
    }
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, name: &str) -> Result<Option<ItemDocument>, Error> {
        let guard = self.inner.read().await;
        Ok(guard.get(name).cloned())
    }

    async fn set_merge(&self, name: &str, patch: &DocumentPatch) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        match guard.get_mut(name) {
            Some(doc) => patch.apply_to(doc),
            None => {
                guard.insert(name.to_string(), patch.clone().into_document());
            }
        }
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.remove(name);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<(String, ItemDocument)>, Error> {
        let guard = self.inner.read().await;
        Ok(guard
            .iter()
            .map(|(name, doc)| (name.clone(), doc.clone()))
            .collect())
    }

    fn store_name(&self) -> &'static str {
        "memory"
    }
}

/// Factory for [`MemoryDocumentStore`]
pub struct MemoryDocumentStoreFactory;

#[async_trait]
impl DocumentStoreFactory for MemoryDocumentStoreFactory {
    async fn create(
        &self,
        config: &DocumentStoreConfig,
    ) -> Result<Box<dyn DocumentStore>, Error> {
        match config {
            DocumentStoreConfig::Memory => Ok(Box::new(MemoryDocumentStore::new())),
            other => Err(Error::config(format!(
                "memory factory cannot build store type {:?}",
                other.type_name()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_basic() {
        let store = MemoryDocumentStore::new();

        // Initially empty
        assert!(store.is_empty().await);
        assert_eq!(store.len().await, 0);

        // Create and get
        store
            .set_merge("eggs", &DocumentPatch::quantity(1))
            .await
            .unwrap();

        assert_eq!(store.len().await, 1);
        assert!(!store.is_empty().await);

        let doc = store.get("eggs").await.unwrap().unwrap();
        assert_eq!(doc.quantity, 1);
        assert!(doc.image_url.is_none());

        // Delete
        store.delete("eggs").await.unwrap();
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_memory_store_merge_preserves_fields() {
        let store = MemoryDocumentStore::new();

        let patch = DocumentPatch::quantity(1)
            .with_image_url(Some("https://example.com/eggs.jpg".to_string()));
        store.set_merge("eggs", &patch).await.unwrap();

        // A quantity-only merge must not clear the image URL
        store
            .set_merge("eggs", &DocumentPatch::quantity(2))
            .await
            .unwrap();

        let doc = store.get("eggs").await.unwrap().unwrap();
        assert_eq!(doc.quantity, 2);
        assert_eq!(
            doc.image_url.as_deref(),
            Some("https://example.com/eggs.jpg")
        );
    }

    #[tokio::test]
    async fn test_memory_store_list() {
        let store = MemoryDocumentStore::new();

        store
            .set_merge("eggs", &DocumentPatch::quantity(1))
            .await
            .unwrap();
        store
            .set_merge("flour", &DocumentPatch::quantity(2))
            .await
            .unwrap();

        let docs = store.list().await.unwrap();
        assert_eq!(docs.len(), 2);
        assert!(docs.iter().any(|(name, _)| name == "eggs"));
        assert!(docs.iter().any(|(name, _)| name == "flour"));
    }
}
