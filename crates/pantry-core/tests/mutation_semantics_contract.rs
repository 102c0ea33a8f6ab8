//! Behavioral Contract Test: Mutation Semantics
//!
//! This test verifies the read-then-write mutation operations against the
//! document store.
//!
//! Constraints verified:
//! - Creation is idempotent by key: re-adding increments, never duplicates
//! - Increment/decrement adjust the quantity by exactly one
//! - A document is deleted at quantity 1, never written at quantity 0
//! - Mutations on unknown names are silent no-ops, not errors
//!
//! If this test fails, the core inventory arithmetic is broken.

mod common;

use common::*;
use pantry_core::MutationOutcome;
use pantry_core::traits::DocumentStore;

#[tokio::test]
async fn fresh_add_creates_single_item_with_quantity_one() {
    let (engine, _event_rx) = memory_engine();

    let outcome = engine.add_item("eggs", None).await.unwrap();
    assert_eq!(outcome, MutationOutcome::Created);

    let items = engine.refresh().await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, "eggs");
    assert_eq!(items[0].quantity, 1);
}

#[tokio::test]
async fn repeated_add_increments_instead_of_duplicating() {
    let (engine, _event_rx) = memory_engine();

    engine.add_item("eggs", None).await.unwrap();
    let outcome = engine.add_item("eggs", None).await.unwrap();
    assert_eq!(outcome, MutationOutcome::Incremented { quantity: 2 });

    // One document, quantity 2: the name is the unique key
    let items = engine.refresh().await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 2);
}

#[tokio::test]
async fn increment_raises_quantity_by_one() {
    let (engine, _event_rx) = memory_engine();

    engine.add_item("flour", None).await.unwrap();
    let outcome = engine.increment_item("flour").await.unwrap();
    assert_eq!(outcome, MutationOutcome::Incremented { quantity: 2 });

    let items = engine.snapshot().await;
    assert_eq!(items[0].quantity, 2);
}

#[tokio::test]
async fn increment_on_unknown_name_writes_nothing() {
    let store = CountingDocumentStore::new();
    let store_handle = CountingDocumentStore::sharing_counters_with(&store);
    let (engine, _event_rx) = engine_with(
        Box::new(store),
        Box::new(pantry_core::MemoryBlobStore::new()),
    );

    let outcome = engine.increment_item("ghost").await.unwrap();
    assert_eq!(outcome, MutationOutcome::Noop);

    // The read happened, but no write or delete did
    assert_eq!(store_handle.get_call_count(), 1);
    assert_eq!(store_handle.set_call_count(), 0);
    assert_eq!(store_handle.delete_call_count(), 0);
    assert!(engine.snapshot().await.is_empty());
}

#[tokio::test]
async fn remove_decrements_above_quantity_one() {
    let (engine, _event_rx) = memory_engine();

    engine.add_item("milk", None).await.unwrap();
    engine.increment_item("milk").await.unwrap();

    let outcome = engine.remove_item("milk").await.unwrap();
    assert_eq!(outcome, MutationOutcome::Decremented { quantity: 1 });
}

#[tokio::test]
async fn remove_at_quantity_one_deletes_the_document() {
    let store = CountingDocumentStore::new();
    let store_handle = CountingDocumentStore::sharing_counters_with(&store);
    let (engine, _event_rx) = engine_with(
        Box::new(store),
        Box::new(pantry_core::MemoryBlobStore::new()),
    );

    engine.add_item("milk", None).await.unwrap();
    let outcome = engine.remove_item("milk").await.unwrap();
    assert_eq!(outcome, MutationOutcome::Deleted);

    // Deleted, not merge-written to zero
    assert_eq!(store_handle.delete_call_count(), 1);
    assert!(store_handle.get("milk").await.unwrap().is_none());
    assert!(engine.snapshot().await.is_empty());
}

#[tokio::test]
async fn remove_on_unknown_name_is_a_noop() {
    let (engine, _event_rx) = memory_engine();

    engine.add_item("eggs", None).await.unwrap();
    let before = engine.snapshot().await;

    let outcome = engine.remove_item("ghost").await.unwrap();
    assert_eq!(outcome, MutationOutcome::Noop);

    // Inventory list unchanged
    let after = engine.snapshot().await;
    assert_eq!(before, after);
}

#[tokio::test]
async fn round_trip_add_increment_remove() {
    let (engine, _event_rx) = memory_engine();

    engine.add_item("eggs", None).await.unwrap();
    let items = engine.snapshot().await;
    assert_eq!(items[0].quantity, 1);

    engine.increment_item("eggs").await.unwrap();
    engine.increment_item("eggs").await.unwrap();
    let items = engine.snapshot().await;
    assert_eq!(items[0].quantity, 3);

    engine.remove_item("eggs").await.unwrap();
    engine.remove_item("eggs").await.unwrap();
    engine.remove_item("eggs").await.unwrap();

    // Fully consumed: the item is absent, not at quantity 0
    assert!(engine.snapshot().await.is_empty());
    assert!(engine.refresh().await.unwrap().is_empty());
}

#[tokio::test]
async fn empty_names_are_rejected_before_any_store_call() {
    let store = CountingDocumentStore::new();
    let store_handle = CountingDocumentStore::sharing_counters_with(&store);
    let (engine, _event_rx) = engine_with(
        Box::new(store),
        Box::new(pantry_core::MemoryBlobStore::new()),
    );

    assert!(engine.add_item("", None).await.is_err());
    assert!(engine.add_item("   ", None).await.is_err());
    assert!(engine.increment_item("").await.is_err());
    assert!(engine.remove_item("").await.is_err());

    assert_eq!(store_handle.get_call_count(), 0);
    assert_eq!(store_handle.set_call_count(), 0);
}
