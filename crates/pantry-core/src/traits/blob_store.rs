// # Blob Store Trait
//
// Defines the interface for the object store that persists item photos.
//
// ## Key Scheme
//
// The engine stores photos under `images/{item name}.jpg`. One photo per
// item: re-adding an item with a new photo overwrites the previous blob at
// the same key.
//
// ## Implementations
//
// - Firebase Storage REST: `pantry-store-firebase` crate
// - Memory, File: built into this crate (`blob` module)

use async_trait::async_trait;

/// Trait for blob store implementations
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Collaborator Discipline
///
/// Same limitations as [`DocumentStore`](crate::DocumentStore): one backend
/// request per method call, no retries, no caching, no background tasks.
/// Upload failures surface as [`Error::UploadFailed`](crate::Error) and the
/// caller decides whether the surrounding operation proceeds.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store an object at the given key, overwriting any previous object
    ///
    /// # Parameters
    ///
    /// - `key`: The object key (e.g., "images/eggs.jpg")
    /// - `bytes`: The object payload
    async fn put_object(&self, key: &str, bytes: &[u8]) -> Result<(), crate::Error>;

    /// Get a publicly retrievable URL for an object
    ///
    /// # Parameters
    ///
    /// - `key`: The object key
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: A URL from which the object can be fetched
    /// - `Err(Error::NotFound)`: No object at this key
    /// - `Err(Error)`: Store error
    async fn public_url(&self, key: &str) -> Result<String, crate::Error>;

    /// Get the store name (for logging/debugging)
    fn store_name(&self) -> &'static str;
}

/// Helper trait for constructing blob stores from configuration
#[async_trait]
pub trait BlobStoreFactory: Send + Sync {
    /// Create a BlobStore instance from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: Configuration specific to this store type
    ///
    /// # Returns
    ///
    /// A boxed BlobStore trait object
    async fn create(
        &self,
        config: &crate::config::BlobStoreConfig,
    ) -> Result<Box<dyn BlobStore>, crate::Error>;
}
