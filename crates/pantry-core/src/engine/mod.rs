//! Core pantry engine
//!
//! The PantryEngine is responsible for:
//! - Applying mutations (add/increment/remove) against the document store
//! - Uploading captured photos to the blob store before an add
//! - Rebuilding the local snapshot wholesale after every mutation
//! - Emitting events for view layers and monitoring
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐
//! │   Caller     │─── add/increment/remove ───┐
//! └──────────────┘                            │
//!                                             ▼
//!                                    ┌──────────────┐
//!                                    │ PantryEngine │
//!                                    └──────────────┘
//!                                             │
//!         ┌───────────────────────────────────┼──────────────────────────┐
//!         │                                   │                          │
//!         ▼                                   ▼                          ▼
//! ┌───────────────┐                  ┌───────────────┐          ┌─────────────┐
//! │ DocumentStore │                  │   BlobStore   │          │   Events    │
//! │ (read/write)  │                  │ (photo upload)│          │  (notify)   │
//! └───────────────┘                  └───────────────┘          └─────────────┘
//! ```
//!
//! ## Mutation Flow
//!
//! 1. Read the document for the item name
//! 2. Decide: create, merge-write an adjusted quantity, or delete
//! 3. Write (one request, no retry)
//! 4. Rebuild the snapshot from a full collection read
//! 5. Emit events for subscribers
//!
//! Each mutation is a sequential read-then-write against the store. There
//! is no transaction and no client-side locking: two concurrent mutations
//! for the same name can interleave and lose an update. That gap is part of
//! the contract for this single-user tool and is pinned by the contract
//! tests rather than hidden here.

use crate::config::EngineConfig;
use crate::error::Result;
use crate::item::{DocumentPatch, InventoryItem, filter_items};
use crate::traits::{BlobStore, DocumentStore, JpegImage};
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, info, warn};

/// Fixed object key for an item's photo
///
/// One photo per item: re-adding a photo overwrites the previous blob at
/// the same key.
pub fn image_object_key(name: &str) -> String {
    format!("images/{}.jpg", name)
}

/// Outcome of a single mutation operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// A new document was created with quantity 1
    Created,

    /// An existing document's quantity was raised
    Incremented {
        /// The quantity after the write
        quantity: u32,
    },

    /// An existing document's quantity was lowered
    Decremented {
        /// The quantity after the write
        quantity: u32,
    },

    /// The document was deleted (quantity reached zero)
    Deleted,

    /// The target document does not exist; nothing was written
    Noop,
}

/// Events emitted by the PantryEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// A mutation was applied to the store
    MutationApplied {
        name: String,
        outcome: MutationOutcome,
    },

    /// A photo was uploaded and is retrievable at the given URL
    PhotoUploaded { name: String, url: String },

    /// The snapshot was rebuilt from the store
    InventoryRefreshed { item_count: usize },

    /// A snapshot rebuild failed; the previous snapshot is stale
    RefreshFailed { error: String },
}

/// Core pantry engine
///
/// The engine owns the store collaborators and the local snapshot. The
/// snapshot is a derived, non-authoritative cache: it is replaced wholesale
/// by [`refresh`](PantryEngine::refresh) and never patched incrementally.
///
/// ## Lifecycle
///
/// 1. Create with [`PantryEngine::new()`]
/// 2. Call mutation methods from the presentation layer
/// 3. Drain the event receiver to observe changes
///
/// ## Threading
///
/// All methods take `&self` and are safe to call from concurrent tasks,
/// but concurrent mutations for the same item name are subject to the
/// lost-update race described in the module docs.
pub struct PantryEngine {
    /// Document store, the system of record
    store: Box<dyn DocumentStore>,

    /// Blob store for item photos
    blobs: Box<dyn BlobStore>,

    /// Local snapshot, rebuilt wholesale by refresh()
    snapshot: RwLock<Vec<InventoryItem>>,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<EngineEvent>,
}

impl PantryEngine {
    /// Create a new pantry engine
    ///
    /// # Parameters
    ///
    /// - `store`: Document store implementation
    /// - `blobs`: Blob store implementation
    /// - `config`: Engine configuration
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields
    /// engine events
    pub fn new(
        store: Box<dyn DocumentStore>,
        blobs: Box<dyn BlobStore>,
        config: EngineConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.event_channel_capacity);

        let engine = Self {
            store,
            blobs,
            snapshot: RwLock::new(Vec::new()),
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// Rebuild the snapshot from the store
    ///
    /// Performs a full collection read, materializes every document into an
    /// [`InventoryItem`], and replaces the cached snapshot wholesale. No
    /// ordering guarantee: document order may differ between calls.
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<InventoryItem>)`: The fresh snapshot
    /// - `Err(Error)`: The store was unreachable; the previous snapshot is
    ///   left in place (stale) for callers that choose to show it
    pub async fn refresh(&self) -> Result<Vec<InventoryItem>> {
        let documents = self.store.list().await?;

        let items: Vec<InventoryItem> = documents
            .into_iter()
            .map(|(name, doc)| InventoryItem::from_document(name, doc))
            .collect();

        {
            let mut snapshot = self.snapshot.write().await;
            *snapshot = items.clone();
        }

        debug!("Snapshot rebuilt: {} item(s)", items.len());
        self.emit_event(EngineEvent::InventoryRefreshed {
            item_count: items.len(),
        });

        Ok(items)
    }

    /// Get the current snapshot
    ///
    /// Returns the cached list as of the last successful refresh. May be
    /// stale if a refresh has failed since the last mutation.
    pub async fn snapshot(&self) -> Vec<InventoryItem> {
        self.snapshot.read().await.clone()
    }

    /// Filter the current snapshot by a search query
    ///
    /// Case-insensitive substring match on the item name; an empty query
    /// returns the full snapshot.
    pub async fn search(&self, query: &str) -> Vec<InventoryItem> {
        let snapshot = self.snapshot.read().await;
        filter_items(&snapshot, query)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Add an item, or increment it if it already exists
    ///
    /// Creation is idempotent by key: adding a previously unseen name twice
    /// yields one document with quantity 2, not two documents. When
    /// `image_url` is provided it overwrites the stored image reference;
    /// when absent the stored reference is preserved.
    ///
    /// # Parameters
    ///
    /// - `name`: The item name (document id), stored case-sensitively
    /// - `image_url`: Optional photo URL to persist on the document
    pub async fn add_item(
        &self,
        name: &str,
        image_url: Option<String>,
    ) -> Result<MutationOutcome> {
        validate_name(name)?;

        let outcome = match self.store.get(name).await? {
            Some(doc) => {
                let quantity = doc.quantity + 1;
                let patch = DocumentPatch::quantity(quantity).with_image_url(image_url);
                self.store.set_merge(name, &patch).await?;
                MutationOutcome::Incremented { quantity }
            }
            None => {
                let patch = DocumentPatch::quantity(1).with_image_url(image_url);
                self.store.set_merge(name, &patch).await?;
                MutationOutcome::Created
            }
        };

        info!("Added {:?}: {:?}", name, outcome);
        self.finish_mutation(name, outcome.clone()).await;
        Ok(outcome)
    }

    /// Increment an existing item's quantity by one
    ///
    /// A no-op (aside from the refresh) when no document exists for the
    /// name.
    pub async fn increment_item(&self, name: &str) -> Result<MutationOutcome> {
        validate_name(name)?;

        let outcome = match self.store.get(name).await? {
            Some(doc) => {
                let quantity = doc.quantity + 1;
                self.store
                    .set_merge(name, &DocumentPatch::quantity(quantity))
                    .await?;
                MutationOutcome::Incremented { quantity }
            }
            None => {
                debug!("Increment for unknown item {:?}, nothing written", name);
                MutationOutcome::Noop
            }
        };

        self.finish_mutation(name, outcome.clone()).await;
        Ok(outcome)
    }

    /// Decrement an item's quantity by one, deleting it at quantity 1
    ///
    /// The quantity is never observable as 0 in the store: deletion is the
    /// terminal state for a fully consumed item. A no-op (aside from the
    /// refresh) when no document exists for the name.
    pub async fn remove_item(&self, name: &str) -> Result<MutationOutcome> {
        validate_name(name)?;

        let outcome = match self.store.get(name).await? {
            Some(doc) if doc.quantity <= 1 => {
                self.store.delete(name).await?;
                MutationOutcome::Deleted
            }
            Some(doc) => {
                let quantity = doc.quantity - 1;
                self.store
                    .set_merge(name, &DocumentPatch::quantity(quantity))
                    .await?;
                MutationOutcome::Decremented { quantity }
            }
            None => {
                debug!("Remove for unknown item {:?}, nothing written", name);
                MutationOutcome::Noop
            }
        };

        self.finish_mutation(name, outcome.clone()).await;
        Ok(outcome)
    }

    /// Add an item with a captured photo
    ///
    /// Uploads the frame to the blob store at `images/{name}.jpg`
    /// (overwriting any previous photo for the item), resolves the public
    /// URL, then runs [`add_item`](PantryEngine::add_item) with it.
    ///
    /// An upload or URL failure aborts the whole operation before any
    /// document write: no item is created without its photo.
    pub async fn add_item_with_photo(
        &self,
        name: &str,
        image: JpegImage,
    ) -> Result<MutationOutcome> {
        validate_name(name)?;

        let url = self.upload_photo(name, &image).await?;
        self.emit_event(EngineEvent::PhotoUploaded {
            name: name.to_string(),
            url: url.clone(),
        });

        self.add_item(name, Some(url)).await
    }

    /// Upload a photo and resolve its public URL
    async fn upload_photo(&self, name: &str, image: &JpegImage) -> Result<String> {
        let key = image_object_key(name);
        debug!(
            "Uploading {} byte(s) to {} at {:?}",
            image.len(),
            self.blobs.store_name(),
            key
        );

        self.blobs.put_object(&key, image.as_bytes()).await?;
        let url = self.blobs.public_url(&key).await?;

        info!("Photo for {:?} stored at {}", name, url);
        Ok(url)
    }

    /// Emit the mutation event and resynchronize the snapshot
    ///
    /// Every mutation ends here, whatever branch it took. A failed refresh
    /// is logged and emitted but does not fail the mutation: the write has
    /// already been applied, and the snapshot simply stays stale until the
    /// next successful refresh.
    async fn finish_mutation(&self, name: &str, outcome: MutationOutcome) {
        self.emit_event(EngineEvent::MutationApplied {
            name: name.to_string(),
            outcome,
        });

        if let Err(e) = self.refresh().await {
            warn!("Snapshot refresh after mutation failed: {}", e);
            self.emit_event(EngineEvent::RefreshFailed {
                error: e.to_string(),
            });
        }
    }

    /// Emit an engine event
    ///
    /// # Parameters
    ///
    /// - `event`: The event to emit
    fn emit_event(&self, event: EngineEvent) {
        // Send event, logging a warning if the channel is full. The event
        // is dropped rather than blocking a mutation on a slow subscriber.
        if self.event_tx.try_send(event).is_err() {
            warn!(
                "Event channel full, dropping event. Consider increasing event_channel_capacity or draining the receiver."
            );
        }
    }
}

/// Reject empty or all-whitespace item names before any store call
fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(crate::Error::invalid_input("item name cannot be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_key_scheme_is_fixed() {
        assert_eq!(image_object_key("eggs"), "images/eggs.jpg");
        assert_eq!(image_object_key("Olive Oil"), "images/Olive Oil.jpg");
    }

    #[test]
    fn mutation_outcomes_are_comparable() {
        let outcome = MutationOutcome::Incremented { quantity: 2 };
        assert_eq!(outcome.clone(), outcome);
        assert_ne!(outcome, MutationOutcome::Created);
    }
}
