//! Plugin-based store registry
//!
//! The registry allows document stores, blob stores, and frame sources to
//! be registered dynamically at runtime, avoiding hardcoded if-else chains.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pantry_core::registry::StoreRegistry;
//! use pantry_core::config::DocumentStoreConfig;
//!
//! // Create a registry
//! let registry = StoreRegistry::new();
//!
//! // Register backends
//! registry.register_document_store("firestore", Box::new(firestore_factory));
//!
//! // Create a store from config
//! let config = DocumentStoreConfig::Firestore { ... };
//! let store = registry.create_document_store(&config).await?;
//! ```
//!
//! ## Registration
//!
//! Implementations should register themselves during initialization:
//!
//! ```rust,ignore
//! // In the pantry-store-firebase crate
//! pub fn register(registry: &StoreRegistry) {
//!     registry.register_document_store("firestore", Box::new(FirestoreFactory));
//!     registry.register_blob_store("firebase", Box::new(FirebaseBlobFactory));
//! }
//! ```

use crate::config::{BlobStoreConfig, CaptureConfig, DocumentStoreConfig};
use crate::error::{Error, Result};
use crate::traits::{BlobStore, DocumentStore, FrameSource};
use crate::traits::{BlobStoreFactory, DocumentStoreFactory, FrameSourceFactory};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Registry for plugin-based backend creation
///
/// The registry maintains maps of backend type names to factory objects,
/// allowing dynamic instantiation based on configuration.
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes.
#[derive(Default)]
pub struct StoreRegistry {
    /// Registered document store factories
    document_stores: RwLock<HashMap<String, Arc<dyn DocumentStoreFactory>>>,

    /// Registered blob store factories
    blob_stores: RwLock<HashMap<String, Arc<dyn BlobStoreFactory>>>,

    /// Registered frame source factories
    frame_sources: RwLock<HashMap<String, Box<dyn FrameSourceFactory>>>,
}

impl StoreRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document store factory
    ///
    /// # Parameters
    ///
    /// - `name`: Store type name (e.g., "firestore", "file", "memory")
    /// - `factory`: Factory object for creating store instances
    pub fn register_document_store(
        &self,
        name: impl Into<String>,
        factory: Box<dyn DocumentStoreFactory>,
    ) {
        let name = name.into();
        let mut stores = self.document_stores.write().unwrap();
        stores.insert(name, Arc::from(factory));
    }

    /// Register a blob store factory
    ///
    /// # Parameters
    ///
    /// - `name`: Store type name (e.g., "firebase", "file", "memory")
    /// - `factory`: Factory object for creating store instances
    pub fn register_blob_store(
        &self,
        name: impl Into<String>,
        factory: Box<dyn BlobStoreFactory>,
    ) {
        let name = name.into();
        let mut stores = self.blob_stores.write().unwrap();
        stores.insert(name, Arc::from(factory));
    }

    /// Register a frame source factory
    ///
    /// # Parameters
    ///
    /// - `name`: Source type name (e.g., "http")
    /// - `factory`: Factory object for creating source instances
    pub fn register_frame_source(
        &self,
        name: impl Into<String>,
        factory: Box<dyn FrameSourceFactory>,
    ) {
        let name = name.into();
        let mut sources = self.frame_sources.write().unwrap();
        sources.insert(name, factory);
    }

    /// Create a document store from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: Document store configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn DocumentStore>)`: Created store instance
    /// - `Err(Error)`: If the store type is not registered or creation fails
    pub async fn create_document_store(
        &self,
        config: &DocumentStoreConfig,
    ) -> Result<Box<dyn DocumentStore>> {
        let store_type = config.type_name().to_string();

        let factory = {
            let stores = self.document_stores.read().unwrap();
            stores
                .get(&store_type)
                .cloned()
                .ok_or_else(|| {
                    Error::config(format!("Unknown document store type: {}", store_type))
                })?
            // Lock released here, before the async create
        };

        factory.create(config).await
    }

    /// Create a blob store from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: Blob store configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn BlobStore>)`: Created store instance
    /// - `Err(Error)`: If the store type is not registered or creation fails
    pub async fn create_blob_store(&self, config: &BlobStoreConfig) -> Result<Box<dyn BlobStore>> {
        let store_type = config.type_name().to_string();

        let factory = {
            let stores = self.blob_stores.read().unwrap();
            stores
                .get(&store_type)
                .cloned()
                .ok_or_else(|| Error::config(format!("Unknown blob store type: {}", store_type)))?
        };

        factory.create(config).await
    }

    /// Create a frame source from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: Frame source configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn FrameSource>)`: Created source instance
    /// - `Err(Error)`: If the source type is not registered or creation fails
    pub fn create_frame_source(&self, config: &CaptureConfig) -> Result<Box<dyn FrameSource>> {
        let source_type = config.type_name();

        let sources = self.frame_sources.read().unwrap();

        let factory = sources
            .get(source_type)
            .ok_or_else(|| Error::config(format!("Unknown frame source type: {}", source_type)))?;

        factory.create(config)
    }

    /// List all registered document store types
    pub fn list_document_stores(&self) -> Vec<String> {
        let stores = self.document_stores.read().unwrap();
        stores.keys().cloned().collect()
    }

    /// List all registered blob store types
    pub fn list_blob_stores(&self) -> Vec<String> {
        let stores = self.blob_stores.read().unwrap();
        stores.keys().cloned().collect()
    }

    /// List all registered frame source types
    pub fn list_frame_sources(&self) -> Vec<String> {
        let sources = self.frame_sources.read().unwrap();
        sources.keys().cloned().collect()
    }

    /// Check if a document store type is registered
    pub fn has_document_store(&self, name: &str) -> bool {
        let stores = self.document_stores.read().unwrap();
        stores.contains_key(name)
    }

    /// Check if a blob store type is registered
    pub fn has_blob_store(&self, name: &str) -> bool {
        let stores = self.blob_stores.read().unwrap();
        stores.contains_key(name)
    }

    /// Check if a frame source type is registered
    pub fn has_frame_source(&self, name: &str) -> bool {
        let sources = self.frame_sources.read().unwrap();
        sources.contains_key(name)
    }
}

/// Register the built-in memory and file backends
///
/// Integration layers call this once before resolving configuration, then
/// let backend crates add their own factories.
pub fn register_builtin(registry: &StoreRegistry) {
    registry.register_document_store(
        "memory",
        Box::new(crate::store::MemoryDocumentStoreFactory),
    );
    registry.register_document_store("file", Box::new(crate::store::FileDocumentStoreFactory));
    registry.register_blob_store("memory", Box::new(crate::blob::MemoryBlobStoreFactory));
    registry.register_blob_store("file", Box::new(crate::blob::FileBlobStoreFactory));
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct MockDocumentStoreFactory;

    #[async_trait]
    impl DocumentStoreFactory for MockDocumentStoreFactory {
        async fn create(
            &self,
            _config: &DocumentStoreConfig,
        ) -> Result<Box<dyn DocumentStore>> {
            Err(Error::not_found("Mock store not implemented"))
        }
    }

    #[test]
    fn test_registry_registration() {
        let registry = StoreRegistry::new();

        // Initially empty
        assert!(!registry.has_document_store("mock"));

        // Register
        registry.register_document_store("mock", Box::new(MockDocumentStoreFactory));

        // Now present
        assert!(registry.has_document_store("mock"));
        assert!(registry
            .list_document_stores()
            .contains(&"mock".to_string()));
    }

    #[tokio::test]
    async fn test_builtin_backends_resolve() {
        let registry = StoreRegistry::new();
        register_builtin(&registry);

        let store = registry
            .create_document_store(&DocumentStoreConfig::Memory)
            .await
            .unwrap();
        assert_eq!(store.store_name(), "memory");

        let blobs = registry
            .create_blob_store(&BlobStoreConfig::Memory)
            .await
            .unwrap();
        assert_eq!(blobs.store_name(), "memory");
    }

    #[tokio::test]
    async fn test_unknown_type_is_a_config_error() {
        let registry = StoreRegistry::new();
        let err = registry
            .create_document_store(&DocumentStoreConfig::Memory)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
