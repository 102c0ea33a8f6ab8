// # pantry-core
//
// Core library for the pantry inventory tracker.
//
// ## Architecture Overview
//
// This library provides the core functionality for tracking pantry items
// against a remote document store and a remote blob store:
// - **DocumentStore**: Trait for the keyed document database that is the
//   system of record (one document per item name)
// - **BlobStore**: Trait for the object store that holds item photos
// - **FrameSource**: Trait for camera collaborators that yield one JPEG
//   frame per capture
// - **PantryEngine**: Orchestrates mutations (add/increment/remove), photo
//   upload, and full resynchronization of the local snapshot
// - **StoreRegistry**: Plugin-based registry for store and capture backends
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from implementations
// 2. **Store as Source of Truth**: The local snapshot is a derived cache,
//    rebuilt wholesale from the document store after every mutation
// 3. **Plugin-Based**: Backends are registered dynamically, no hard-coded
//    if-else
// 4. **Library-First**: All core functionality can be used as a library
// 5. **No Hidden Coordination**: Mutations are plain read-then-write
//    sequences; collaborator failures propagate to the caller without
//    retries

pub mod traits;
pub mod engine;
pub mod registry;
pub mod config;
pub mod error;
pub mod item;
pub mod store;
pub mod blob;

// Re-export core types for convenience
pub use traits::{DocumentStore, BlobStore, FrameSource, JpegImage};
pub use engine::{PantryEngine, EngineEvent, MutationOutcome};
pub use registry::StoreRegistry;
pub use config::{PantryConfig, DocumentStoreConfig, BlobStoreConfig, CaptureConfig};
pub use error::{Error, Result};
pub use item::{InventoryItem, ItemDocument, DocumentPatch, filter_items};
pub use store::{MemoryDocumentStore, FileDocumentStore};
pub use blob::{MemoryBlobStore, FileBlobStore};
