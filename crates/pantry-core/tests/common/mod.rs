//! Test doubles and common utilities for architecture contract tests
//!
//! This module provides minimal test doubles that verify behavioral
//! contracts without talking to real backends.

#![allow(dead_code)]

use pantry_core::config::EngineConfig;
use pantry_core::engine::{EngineEvent, PantryEngine};
use pantry_core::error::Result;
use pantry_core::item::{DocumentPatch, ItemDocument};
use pantry_core::store::MemoryDocumentStore;
use pantry_core::traits::{BlobStore, DocumentStore, FrameSource, JpegImage};
use pantry_core::{Error, MemoryBlobStore};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::{Barrier, mpsc};

/// A minimal valid JPEG payload (SOI marker plus filler)
pub fn tiny_jpeg() -> JpegImage {
    JpegImage::from_bytes(vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0xFF, 0xD9])
        .expect("tiny jpeg is valid")
}

/// Build an engine over the given doubles with default settings
pub fn engine_with(
    store: Box<dyn DocumentStore>,
    blobs: Box<dyn BlobStore>,
) -> (PantryEngine, mpsc::Receiver<EngineEvent>) {
    PantryEngine::new(store, blobs, EngineConfig::default()).expect("engine construction succeeds")
}

/// Build an engine over fresh memory stores
pub fn memory_engine() -> (PantryEngine, mpsc::Receiver<EngineEvent>) {
    engine_with(
        Box::new(MemoryDocumentStore::new()),
        Box::new(MemoryBlobStore::new()),
    )
}

/// A document store that tracks calls while delegating to a memory store
#[derive(Debug)]
pub struct CountingDocumentStore {
    /// Call counter for get()
    get_call_count: Arc<AtomicUsize>,
    /// Call counter for set_merge()
    set_call_count: Arc<AtomicUsize>,
    /// Call counter for delete()
    delete_call_count: Arc<AtomicUsize>,
    /// Call counter for list()
    list_call_count: Arc<AtomicUsize>,
    /// Backing documents
    inner: MemoryDocumentStore,
}

impl CountingDocumentStore {
    pub fn new() -> Self {
        Self {
            get_call_count: Arc::new(AtomicUsize::new(0)),
            set_call_count: Arc::new(AtomicUsize::new(0)),
            delete_call_count: Arc::new(AtomicUsize::new(0)),
            list_call_count: Arc::new(AtomicUsize::new(0)),
            inner: MemoryDocumentStore::new(),
        }
    }

    /// Get the number of times get() was called
    pub fn get_call_count(&self) -> usize {
        self.get_call_count.load(Ordering::SeqCst)
    }

    /// Get the number of times set_merge() was called
    pub fn set_call_count(&self) -> usize {
        self.set_call_count.load(Ordering::SeqCst)
    }

    /// Get the number of times delete() was called
    pub fn delete_call_count(&self) -> usize {
        self.delete_call_count.load(Ordering::SeqCst)
    }

    /// Get the number of times list() was called
    pub fn list_call_count(&self) -> usize {
        self.list_call_count.load(Ordering::SeqCst)
    }

    /// Create a new CountingDocumentStore that shares counters and
    /// documents with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            get_call_count: Arc::clone(&other.get_call_count),
            set_call_count: Arc::clone(&other.set_call_count),
            delete_call_count: Arc::clone(&other.delete_call_count),
            list_call_count: Arc::clone(&other.list_call_count),
            inner: other.inner.clone(),
        }
    }
}

#[async_trait::async_trait]
impl DocumentStore for CountingDocumentStore {
    async fn get(&self, name: &str) -> Result<Option<ItemDocument>> {
        self.get_call_count.fetch_add(1, Ordering::SeqCst);
        self.inner.get(name).await
    }

    async fn set_merge(&self, name: &str, patch: &DocumentPatch) -> Result<()> {
        self.set_call_count.fetch_add(1, Ordering::SeqCst);
        self.inner.set_merge(name, patch).await
    }

    async fn delete(&self, name: &str) -> Result<()> {
        self.delete_call_count.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(name).await
    }

    async fn list(&self) -> Result<Vec<(String, ItemDocument)>> {
        self.list_call_count.fetch_add(1, Ordering::SeqCst);
        self.inner.list().await
    }

    fn store_name(&self) -> &'static str {
        "counting"
    }
}

/// A document store whose reads rendezvous at a barrier
///
/// Used to force two concurrent mutations to both observe the same
/// pre-write state: each get() waits until `parties` readers have arrived
/// before returning.
#[derive(Debug)]
pub struct StallingDocumentStore {
    barrier: Arc<Barrier>,
    inner: MemoryDocumentStore,
}

impl StallingDocumentStore {
    pub fn new(parties: usize) -> Self {
        Self {
            barrier: Arc::new(Barrier::new(parties)),
            inner: MemoryDocumentStore::new(),
        }
    }

    /// Create a new StallingDocumentStore that shares the barrier and
    /// documents with an existing one
    pub fn sharing_state_with(other: &Self) -> Self {
        Self {
            barrier: Arc::clone(&other.barrier),
            inner: other.inner.clone(),
        }
    }
}

#[async_trait::async_trait]
impl DocumentStore for StallingDocumentStore {
    async fn get(&self, name: &str) -> Result<Option<ItemDocument>> {
        let doc = self.inner.get(name).await?;
        // Hold every reader here until all expected readers have read
        self.barrier.wait().await;
        Ok(doc)
    }

    async fn set_merge(&self, name: &str, patch: &DocumentPatch) -> Result<()> {
        self.inner.set_merge(name, patch).await
    }

    async fn delete(&self, name: &str) -> Result<()> {
        self.inner.delete(name).await
    }

    async fn list(&self) -> Result<Vec<(String, ItemDocument)>> {
        self.inner.list().await
    }

    fn store_name(&self) -> &'static str {
        "stalling"
    }
}

/// A document store whose list() can be switched to fail
///
/// Writes keep working, so a mutation can succeed while the following
/// refresh fails.
#[derive(Debug)]
pub struct FlakyListStore {
    fail_list: Arc<AtomicBool>,
    inner: MemoryDocumentStore,
}

impl FlakyListStore {
    pub fn new() -> Self {
        Self {
            fail_list: Arc::new(AtomicBool::new(false)),
            inner: MemoryDocumentStore::new(),
        }
    }

    /// Switch list() failures on or off
    pub fn set_list_fails(&self, fails: bool) {
        self.fail_list.store(fails, Ordering::SeqCst);
    }

    /// Create a new FlakyListStore that shares state with an existing one
    pub fn sharing_state_with(other: &Self) -> Self {
        Self {
            fail_list: Arc::clone(&other.fail_list),
            inner: other.inner.clone(),
        }
    }
}

#[async_trait::async_trait]
impl DocumentStore for FlakyListStore {
    async fn get(&self, name: &str) -> Result<Option<ItemDocument>> {
        self.inner.get(name).await
    }

    async fn set_merge(&self, name: &str, patch: &DocumentPatch) -> Result<()> {
        self.inner.set_merge(name, patch).await
    }

    async fn delete(&self, name: &str) -> Result<()> {
        self.inner.delete(name).await
    }

    async fn list(&self) -> Result<Vec<(String, ItemDocument)>> {
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(Error::store_unavailable("listing is switched off"));
        }
        self.inner.list().await
    }

    fn store_name(&self) -> &'static str {
        "flaky-list"
    }
}

/// A blob store whose uploads always fail
pub struct FailingBlobStore {
    /// Call counter for put_object()
    put_call_count: Arc<AtomicUsize>,
}

impl FailingBlobStore {
    pub fn new() -> Self {
        Self {
            put_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get the number of times put_object() was called
    pub fn put_call_count(&self) -> usize {
        self.put_call_count.load(Ordering::SeqCst)
    }

    /// Create a new FailingBlobStore that shares counters with an
    /// existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            put_call_count: Arc::clone(&other.put_call_count),
        }
    }
}

#[async_trait::async_trait]
impl BlobStore for FailingBlobStore {
    async fn put_object(&self, _key: &str, _bytes: &[u8]) -> Result<()> {
        self.put_call_count.fetch_add(1, Ordering::SeqCst);
        Err(Error::upload_failed("blob store is down"))
    }

    async fn public_url(&self, key: &str) -> Result<String> {
        Err(Error::not_found(format!("no object at key {:?}", key)))
    }

    fn store_name(&self) -> &'static str {
        "failing"
    }
}

/// A frame source that returns a fixed frame and counts captures
pub struct StaticFrameSource {
    frame: JpegImage,
    capture_call_count: Arc<AtomicUsize>,
}

impl StaticFrameSource {
    pub fn new(frame: JpegImage) -> Self {
        Self {
            frame,
            capture_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get the number of times capture_frame() was called
    pub fn capture_call_count(&self) -> usize {
        self.capture_call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl FrameSource for StaticFrameSource {
    async fn capture_frame(&self) -> Result<JpegImage> {
        self.capture_call_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.frame.clone())
    }

    fn source_name(&self) -> &'static str {
        "static"
    }
}
