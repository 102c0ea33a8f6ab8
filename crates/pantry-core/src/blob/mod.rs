// # Blob Store Implementations
//
// This module provides implementations of the BlobStore trait for
// different persistence strategies.

pub mod file;
pub mod memory;

pub use file::{FileBlobStore, FileBlobStoreFactory};
pub use memory::{MemoryBlobStore, MemoryBlobStoreFactory};
