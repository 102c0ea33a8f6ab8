//! Core traits for the pantry tracker
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`DocumentStore`]: Keyed document database, the system of record
//! - [`BlobStore`]: Object store for item photos
//! - [`FrameSource`]: Camera collaborator yielding one JPEG frame per capture

pub mod document_store;
pub mod blob_store;
pub mod frame_source;

pub use document_store::{DocumentStore, DocumentStoreFactory};
pub use blob_store::{BlobStore, BlobStoreFactory};
pub use frame_source::{FrameSource, FrameSourceFactory, JpegImage};
