// # Firebase Backends
//
// This crate provides the cloud backends for the pantry tracker:
//
// - [`FirestoreDocumentStore`]: DocumentStore over the Firestore REST API
// - [`FirebaseBlobStore`]: BlobStore over the Firebase Storage REST API
//
// ## Implementation Notes
//
// - One HTTP request per store method call (pagination on `list` is the
//   one exception); no retry, backoff, or caching here. Failures propagate
//   to the engine's caller, which decides what to do.
// - Works against projects with public security rules out of the box; an
//   optional bearer token covers locked-down projects.
// - Dry-run mode (`PANTRY_MODE=dry-run`) performs all reads but skips
//   writes, logging what would have been changed.
// - The bearer token never appears in logs; `Debug` output redacts it.
//
// ## API References
//
// - Firestore REST v1: https://firebase.google.com/docs/firestore/use-rest-api
// - Firebase Storage REST: https://firebase.google.com/docs/reference/rest/storage/rest

pub mod firestore;
pub mod storage;

pub use firestore::{FirestoreDocumentStore, FirestoreFactory};
pub use storage::{FirebaseBlobStore, FirebaseBlobFactory};

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

/// Characters escaped when a value is embedded in a REST path segment
///
/// Includes `/` so object keys like `images/eggs.jpg` become a single
/// path segment (`images%2Feggs.jpg`), the addressing scheme Firebase
/// Storage uses.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'%')
    .add(b'/');

/// Escape a document id or object key for use in a REST path
pub(crate) fn encode_path_segment(raw: &str) -> String {
    utf8_percent_encode(raw, PATH_SEGMENT).to_string()
}

/// Check whether dry-run mode was requested via the environment
pub(crate) fn dry_run_from_env() -> bool {
    std::env::var("PANTRY_MODE").unwrap_or_default().to_lowercase() == "dry-run"
}

/// Register the Firebase backends with a registry
///
/// This function should be called during initialization to make the
/// Firestore document store and the Firebase blob store available.
///
/// # Example
///
/// ```rust
/// use pantry_core::StoreRegistry;
///
/// let registry = StoreRegistry::new();
/// pantry_store_firebase::register(&registry);
/// ```
pub fn register(registry: &pantry_core::StoreRegistry) {
    registry.register_document_store("firestore", Box::new(FirestoreFactory));
    registry.register_blob_store("firebase", Box::new(FirebaseBlobFactory));
}
