// # Document Store Trait
//
// Defines the interface for the keyed document database that is the system
// of record for inventory.
//
// ## Data Model
//
// One document per item, keyed by the item name. Document body is
// [`ItemDocument`]: `{quantity, imageUrl?}`.
//
// ## Implementations
//
// - Firestore REST: `pantry-store-firebase` crate
// - Memory, File: built into this crate (`store` module)
//
// ## Usage
//
// ```rust,ignore
// use pantry_core::DocumentStore;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let store = /* DocumentStore implementation */;
//
//     // Read a document
//     let doc = store.get("eggs").await?;
//
//     // Merge-write a field
//     store.set_merge("eggs", &DocumentPatch::quantity(2)).await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::item::{DocumentPatch, ItemDocument};

/// Trait for document store implementations
///
/// This is the narrow repository interface the engine works against:
/// get-by-id, merge-write, delete-by-id, list-all. Implementations must
/// handle the specifics of their backing service.
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Collaborator Discipline
///
/// Document stores are external integrations with strict limitations:
///
/// - One backend request per method call; no retry or backoff logic
///   (failures propagate to the caller, which decides what to do)
/// - No caching between calls (the engine owns the snapshot cache)
/// - No business decisions: whether to create, increment, or delete a
///   document is owned by `PantryEngine`
/// - No background tasks
#[async_trait]
pub trait DocumentStore: Send + Sync + std::fmt::Debug {
    /// Get a document by item name
    ///
    /// # Parameters
    ///
    /// - `name`: The item name (document id)
    ///
    /// # Returns
    ///
    /// - `Ok(Some(ItemDocument))`: The document
    /// - `Ok(None)`: No document for this name
    /// - `Err(Error)`: Store error
    async fn get(&self, name: &str) -> Result<Option<ItemDocument>, crate::Error>;

    /// Merge-write a document
    ///
    /// Writes only the fields present in the patch, preserving all others.
    /// Creates the document when it does not exist.
    ///
    /// # Parameters
    ///
    /// - `name`: The item name (document id)
    /// - `patch`: The fields to write
    async fn set_merge(&self, name: &str, patch: &DocumentPatch) -> Result<(), crate::Error>;

    /// Delete a document by item name
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Successfully deleted (or didn't exist)
    /// - `Err(Error)`: Store error
    async fn delete(&self, name: &str) -> Result<(), crate::Error>;

    /// List all documents in the collection
    ///
    /// No ordering guarantee: consumers must not assume document order is
    /// stable between calls.
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<(String, ItemDocument)>)`: Name/document pairs
    /// - `Err(Error)`: Store error
    async fn list(&self) -> Result<Vec<(String, ItemDocument)>, crate::Error>;

    /// Get the store name (for logging/debugging)
    ///
    /// # Returns
    ///
    /// A static string identifying the backend (e.g., "firestore", "memory")
    fn store_name(&self) -> &'static str;
}

/// Helper trait for constructing document stores from configuration
#[async_trait]
pub trait DocumentStoreFactory: Send + Sync {
    /// Create a DocumentStore instance from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: Configuration specific to this store type
    ///
    /// # Returns
    ///
    /// A boxed DocumentStore trait object
    async fn create(
        &self,
        config: &crate::config::DocumentStoreConfig,
    ) -> Result<Box<dyn DocumentStore>, crate::Error>;
}
