// # Document Store Implementations
//
// This module provides implementations of the DocumentStore trait for
// different persistence strategies.

pub mod file;
pub mod memory;

pub use file::{FileDocumentStore, FileDocumentStoreFactory};
pub use memory::{MemoryDocumentStore, MemoryDocumentStoreFactory};
