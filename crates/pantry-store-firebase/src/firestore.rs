// # Firestore Document Store
//
// DocumentStore implementation over the Firestore REST API v1.
//
// ## Wire Mapping
//
// One Firestore document per item, in a single collection (default
// `pantry`), document id = item name:
//
// ```json
// {
//   "fields": {
//     "quantity": { "integerValue": "3" },
//     "imageUrl": { "stringValue": "https://..." }
//   }
// }
// ```
//
// - `get`      → GET    /documents/{collection}/{name} (404 → absent)
// - `set_merge`→ PATCH  ...?updateMask.fieldPaths=... (merge-write; creates
//                the document when it does not exist)
// - `delete`   → DELETE /documents/{collection}/{name} (404 tolerated)
// - `list`     → GET    /documents/{collection} with pageToken pagination

use async_trait::async_trait;
use pantry_core::config::DocumentStoreConfig;
use pantry_core::item::{DocumentPatch, ItemDocument};
use pantry_core::traits::{DocumentStore, DocumentStoreFactory};
use pantry_core::{Error, Result};
use serde_json::{Value, json};
use std::time::Duration;

use crate::encode_path_segment;

/// Firestore REST API base URL
const FIRESTORE_API_BASE: &str = "https://firestore.googleapis.com/v1";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Page size for collection listing
const LIST_PAGE_SIZE: u32 = 300;

/// Firestore-backed document store
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the store will:
/// - Perform all GET requests (document reads, listing)
/// - Log the intended PATCH/DELETE payloads
/// - **NOT** actually modify documents
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the bearer token.
pub struct FirestoreDocumentStore {
    /// Cloud project id
    project_id: String,

    /// Collection holding the item documents
    collection: String,

    /// Optional bearer token for authenticated projects
    /// Never log this value
    auth_token: Option<String>,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: if true, perform GET requests but skip writes
    dry_run: bool,
}

// Custom Debug implementation that hides the bearer token
impl std::fmt::Debug for FirestoreDocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirestoreDocumentStore")
            .field("project_id", &self.project_id)
            .field("collection", &self.collection)
            .field("auth_token", &"<REDACTED>")
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl FirestoreDocumentStore {
    /// Create a new Firestore document store
    ///
    /// # Parameters
    ///
    /// - `project_id`: Cloud project id
    /// - `collection`: Collection holding the item documents
    /// - `auth_token`: Optional bearer token; `None` for projects with
    ///   public security rules
    /// - `dry_run`: If true, perform GET requests but skip writes
    pub fn new(
        project_id: impl Into<String>,
        collection: impl Into<String>,
        auth_token: Option<String>,
        dry_run: bool,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            project_id: project_id.into(),
            collection: collection.into(),
            auth_token,
            client,
            dry_run,
        }
    }

    /// URL of the collection
    fn collection_url(&self) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents/{}",
            FIRESTORE_API_BASE,
            self.project_id,
            encode_path_segment(&self.collection)
        )
    }

    /// URL of one document
    fn document_url(&self, name: &str) -> String {
        format!("{}/{}", self.collection_url(), encode_path_segment(name))
    }

    /// Attach the bearer token when one is configured
    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.auth_token {
            Some(ref token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Map a non-success response to an error, consuming the response body
    ///
    /// Everything surfaces as `StoreUnavailable`: the caller treats auth,
    /// quota, and server failures alike (the document store is simply not
    /// usable right now). 404 is handled by the callers that expect it.
    async fn error_for(&self, operation: &str, response: reqwest::Response) -> Error {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());

        let detail = match status.as_u16() {
            401 | 403 => format!(
                "authentication failed: invalid or missing bearer token, or insufficient rules. Status: {}",
                status
            ),
            429 => format!("rate limit exceeded. Status: {}", status),
            500..=599 => format!("Firestore server error (transient): {} - {}", status, body),
            _ => format!("{} - {}", status, body),
        };

        Error::store_unavailable(format!("Firestore {} failed: {}", operation, detail))
    }
}

/// Encode a merge patch as Firestore fields
fn encode_fields(patch: &DocumentPatch) -> Value {
    let mut fields = serde_json::Map::new();
    if let Some(quantity) = patch.quantity {
        fields.insert(
            "quantity".to_string(),
            json!({ "integerValue": quantity.to_string() }),
        );
    }
    if let Some(ref url) = patch.image_url {
        fields.insert("imageUrl".to_string(), json!({ "stringValue": url }));
    }
    json!({ "fields": fields })
}

/// Decode a Firestore document body into an [`ItemDocument`]
fn decode_document(doc: &Value) -> Result<ItemDocument> {
    let fields = doc
        .get("fields")
        .and_then(Value::as_object)
        .ok_or_else(|| {
            Error::backend("firestore", "Invalid response format: missing fields map")
        })?;

    let quantity = fields
        .get("quantity")
        .and_then(|v| v.get("integerValue"))
        .and_then(Value::as_str)
        .ok_or_else(|| {
            Error::backend(
                "firestore",
                "Invalid response format: quantity is not an integerValue",
            )
        })?
        .parse::<u32>()
        .map_err(|e| {
            Error::backend("firestore", format!("Invalid quantity in document: {}", e))
        })?;

    // Tolerate documents written with an empty-string imageUrl
    let image_url = fields
        .get("imageUrl")
        .and_then(|v| v.get("stringValue"))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Ok(ItemDocument {
        quantity,
        image_url,
    })
}

/// Extract the document id from a full Firestore resource path
fn document_id(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[async_trait]
impl DocumentStore for FirestoreDocumentStore {
    async fn get(&self, name: &str) -> Result<Option<ItemDocument>> {
        let url = self.document_url(name);
        tracing::debug!("Fetching document {:?}", name);

        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|e| Error::store_unavailable(format!("HTTP request failed: {}", e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(self.error_for("get", response).await);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| Error::backend("firestore", format!("Failed to parse response: {}", e)))?;

        Ok(Some(decode_document(&body)?))
    }

    async fn set_merge(&self, name: &str, patch: &DocumentPatch) -> Result<()> {
        let url = self.document_url(name);
        let payload = encode_fields(patch);

        // updateMask restricts the write to exactly the patched fields,
        // which is what makes this a merge rather than an overwrite
        let mut query: Vec<(&str, &str)> = Vec::new();
        if patch.quantity.is_some() {
            query.push(("updateMask.fieldPaths", "quantity"));
        }
        if patch.image_url.is_some() {
            query.push(("updateMask.fieldPaths", "imageUrl"));
        }

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send PATCH request to {} with payload: {}",
                url,
                payload
            );
            return Ok(());
        }

        let response = self
            .authorize(self.client.patch(&url).query(&query).json(&payload))
            .send()
            .await
            .map_err(|e| Error::store_unavailable(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(self.error_for("set_merge", response).await);
        }

        tracing::debug!("Merged document {:?}: {:?}", name, patch);
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<()> {
        let url = self.document_url(name);

        if self.dry_run {
            tracing::info!("[DRY-RUN] Would send DELETE request to {}", url);
            return Ok(());
        }

        let response = self
            .authorize(self.client.delete(&url))
            .send()
            .await
            .map_err(|e| Error::store_unavailable(format!("HTTP request failed: {}", e)))?;

        // Deleting an absent document is not an error
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(());
        }
        if !response.status().is_success() {
            return Err(self.error_for("delete", response).await);
        }

        tracing::debug!("Deleted document {:?}", name);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<(String, ItemDocument)>> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page_size = LIST_PAGE_SIZE.to_string();
            let mut query: Vec<(&str, &str)> = vec![("pageSize", page_size.as_str())];
            if let Some(ref token) = page_token {
                query.push(("pageToken", token.as_str()));
            }

            let response = self
                .authorize(self.client.get(self.collection_url()).query(&query))
                .send()
                .await
                .map_err(|e| Error::store_unavailable(format!("HTTP request failed: {}", e)))?;

            if !response.status().is_success() {
                return Err(self.error_for("list", response).await);
            }

            let body: Value = response.json().await.map_err(|e| {
                Error::backend("firestore", format!("Failed to parse response: {}", e))
            })?;

            // An empty collection comes back with no documents array
            if let Some(page) = body.get("documents").and_then(Value::as_array) {
                for doc in page {
                    let path = doc.get("name").and_then(Value::as_str).ok_or_else(|| {
                        Error::backend(
                            "firestore",
                            "Invalid response format: document name is not a string",
                        )
                    })?;
                    documents.push((document_id(path).to_string(), decode_document(doc)?));
                }
            }

            match body.get("nextPageToken").and_then(Value::as_str) {
                Some(token) if !token.is_empty() => page_token = Some(token.to_string()),
                _ => break,
            }
        }

        tracing::debug!("Listed {} document(s)", documents.len());
        Ok(documents)
    }

    fn store_name(&self) -> &'static str {
        "firestore"
    }
}

/// Factory for creating Firestore document stores
pub struct FirestoreFactory;

#[async_trait]
impl DocumentStoreFactory for FirestoreFactory {
    async fn create(&self, config: &DocumentStoreConfig) -> Result<Box<dyn DocumentStore>> {
        match config {
            DocumentStoreConfig::Firestore {
                project_id,
                collection,
                auth_token,
            } => {
                if project_id.is_empty() {
                    return Err(Error::config("Firestore project id is required"));
                }

                let dry_run = crate::dry_run_from_env();
                if dry_run {
                    tracing::warn!(
                        "Firestore store running in DRY-RUN mode - no changes will be made"
                    );
                }

                Ok(Box::new(FirestoreDocumentStore::new(
                    project_id.clone(),
                    collection.clone(),
                    auth_token.clone(),
                    dry_run,
                )))
            }
            _ => Err(Error::config("Invalid config for Firestore store")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_fields_covers_only_patched_fields() {
        let patch = DocumentPatch::quantity(3);
        let encoded = encode_fields(&patch);
        assert_eq!(encoded["fields"]["quantity"]["integerValue"], "3");
        assert!(encoded["fields"].get("imageUrl").is_none());

        let patch =
            DocumentPatch::quantity(1).with_image_url(Some("https://x.test/a.jpg".to_string()));
        let encoded = encode_fields(&patch);
        assert_eq!(
            encoded["fields"]["imageUrl"]["stringValue"],
            "https://x.test/a.jpg"
        );
    }

    #[test]
    fn test_decode_document_roundtrip() {
        let body = json!({
            "name": "projects/p/databases/(default)/documents/pantry/eggs",
            "fields": {
                "quantity": { "integerValue": "4" },
                "imageUrl": { "stringValue": "https://x.test/eggs.jpg" }
            }
        });
        let doc = decode_document(&body).unwrap();
        assert_eq!(doc.quantity, 4);
        assert_eq!(doc.image_url.as_deref(), Some("https://x.test/eggs.jpg"));
    }

    #[test]
    fn test_decode_document_treats_empty_url_as_absent() {
        let body = json!({
            "fields": {
                "quantity": { "integerValue": "1" },
                "imageUrl": { "stringValue": "" }
            }
        });
        let doc = decode_document(&body).unwrap();
        assert!(doc.image_url.is_none());
    }

    #[test]
    fn test_decode_document_rejects_missing_quantity() {
        let body = json!({ "fields": {} });
        assert!(decode_document(&body).is_err());
    }

    #[test]
    fn test_document_id_extraction() {
        assert_eq!(
            document_id("projects/p/databases/(default)/documents/pantry/eggs"),
            "eggs"
        );
        assert_eq!(document_id("eggs"), "eggs");
    }

    #[tokio::test]
    async fn test_factory_creation() {
        let factory = FirestoreFactory;

        let config = DocumentStoreConfig::Firestore {
            project_id: "pantry-test".to_string(),
            collection: "pantry".to_string(),
            auth_token: None,
        };

        let store = factory.create(&config).await;
        assert!(store.is_ok());
        assert_eq!(store.unwrap().store_name(), "firestore");
    }

    #[tokio::test]
    async fn test_factory_rejects_wrong_config() {
        let factory = FirestoreFactory;
        let result = factory.create(&DocumentStoreConfig::Memory).await;
        assert!(result.is_err());
    }
}
