// # Firebase Storage Blob Store
//
// BlobStore implementation over the Firebase Storage REST API v0.
//
// ## Wire Mapping
//
// Objects live in one bucket, keyed by the full object key as a single
// escaped path segment:
//
// - `put_object` → POST /v0/b/{bucket}/o?name={key}&uploadType=media
// - `public_url` → GET  /v0/b/{bucket}/o/{key} (object metadata), then
//   build `.../o/{key}?alt=media[&token={downloadToken}]`
//
// The download token, when the bucket issues one, makes the URL fetchable
// without further authentication, which is what the document store needs
// to hand view layers a usable image reference.

use async_trait::async_trait;
use pantry_core::config::BlobStoreConfig;
use pantry_core::traits::{BlobStore, BlobStoreFactory};
use pantry_core::{Error, Result};
use serde_json::Value;
use std::time::Duration;

use crate::encode_path_segment;

/// Firebase Storage REST API base URL
const STORAGE_API_BASE: &str = "https://firebasestorage.googleapis.com/v0";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Firebase Storage-backed blob store
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, uploads are logged but not performed.
/// `public_url` still performs its metadata GET.
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the bearer token.
pub struct FirebaseBlobStore {
    /// Storage bucket name
    bucket: String,

    /// Optional bearer token for authenticated buckets
    /// Never log this value
    auth_token: Option<String>,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: if true, skip uploads
    dry_run: bool,
}

// Custom Debug implementation that hides the bearer token
impl std::fmt::Debug for FirebaseBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseBlobStore")
            .field("bucket", &self.bucket)
            .field("auth_token", &"<REDACTED>")
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl FirebaseBlobStore {
    /// Create a new Firebase Storage blob store
    ///
    /// # Parameters
    ///
    /// - `bucket`: Storage bucket name (e.g., "my-project.appspot.com")
    /// - `auth_token`: Optional bearer token; `None` for buckets with
    ///   public security rules
    /// - `dry_run`: If true, skip uploads
    pub fn new(bucket: impl Into<String>, auth_token: Option<String>, dry_run: bool) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            bucket: bucket.into(),
            auth_token,
            client,
            dry_run,
        }
    }

    /// URL of one object's metadata
    fn object_url(&self, key: &str) -> String {
        format!(
            "{}/b/{}/o/{}",
            STORAGE_API_BASE,
            self.bucket,
            encode_path_segment(key)
        )
    }

    /// URL for uploading an object
    fn upload_url(&self) -> String {
        format!("{}/b/{}/o", STORAGE_API_BASE, self.bucket)
    }

    /// Attach the bearer token when one is configured
    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.auth_token {
            Some(ref token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl BlobStore for FirebaseBlobStore {
    async fn put_object(&self, key: &str, bytes: &[u8]) -> Result<()> {
        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would upload {} byte(s) to bucket {} at {:?}",
                bytes.len(),
                self.bucket,
                key
            );
            return Ok(());
        }

        let response = self
            .authorize(
                self.client
                    .post(self.upload_url())
                    .query(&[("name", key), ("uploadType", "media")])
                    .header("Content-Type", "image/jpeg")
                    .body(bytes.to_vec()),
            )
            .send()
            .await
            .map_err(|e| Error::upload_failed(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());

            return Err(match status.as_u16() {
                401 | 403 => Error::upload_failed(format!(
                    "authentication failed: invalid or missing bearer token, or insufficient rules. Status: {}",
                    status
                )),
                429 => Error::upload_failed(format!("rate limit exceeded. Status: {}", status)),
                500..=599 => Error::upload_failed(format!(
                    "Storage server error (transient): {} - {}",
                    status, body
                )),
                _ => Error::upload_failed(format!("upload rejected: {} - {}", status, body)),
            });
        }

        tracing::debug!(
            "Uploaded {} byte(s) to bucket {} at {:?}",
            bytes.len(),
            self.bucket,
            key
        );
        Ok(())
    }

    async fn public_url(&self, key: &str) -> Result<String> {
        let url = self.object_url(key);

        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|e| Error::upload_failed(format!("HTTP request failed: {}", e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::not_found(format!("no object at key {:?}", key)));
        }
        if !response.status().is_success() {
            let status = response.status();
            return Err(Error::upload_failed(format!(
                "metadata fetch failed: {}",
                status
            )));
        }

        let metadata: Value = response
            .json()
            .await
            .map_err(|e| Error::backend("storage", format!("Failed to parse response: {}", e)))?;

        // A download token makes the URL fetchable by anyone holding it
        let token = metadata
            .get("downloadTokens")
            .and_then(Value::as_str)
            .and_then(|tokens| tokens.split(',').next())
            .filter(|t| !t.is_empty());

        let public = match token {
            Some(token) => format!("{}?alt=media&token={}", url, token),
            None => format!("{}?alt=media", url),
        };

        Ok(public)
    }

    fn store_name(&self) -> &'static str {
        "firebase"
    }
}

/// Factory for creating Firebase Storage blob stores
pub struct FirebaseBlobFactory;

#[async_trait]
impl BlobStoreFactory for FirebaseBlobFactory {
    async fn create(&self, config: &BlobStoreConfig) -> Result<Box<dyn BlobStore>> {
        match config {
            BlobStoreConfig::Firebase { bucket, auth_token } => {
                if bucket.is_empty() {
                    return Err(Error::config("Firebase bucket is required"));
                }

                let dry_run = crate::dry_run_from_env();
                if dry_run {
                    tracing::warn!(
                        "Firebase blob store running in DRY-RUN mode - no uploads will be made"
                    );
                }

                Ok(Box::new(FirebaseBlobStore::new(
                    bucket.clone(),
                    auth_token.clone(),
                    dry_run,
                )))
            }
            _ => Err(Error::config("Invalid config for Firebase blob store")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_url_escapes_the_key() {
        let store = FirebaseBlobStore::new("bucket.appspot.com", None, false);
        assert_eq!(
            store.object_url("images/eggs.jpg"),
            "https://firebasestorage.googleapis.com/v0/b/bucket.appspot.com/o/images%2Feggs.jpg"
        );
    }

    #[test]
    fn test_debug_redacts_the_token() {
        let store =
            FirebaseBlobStore::new("bucket.appspot.com", Some("secret-token".to_string()), false);
        let debug = format!("{:?}", store);
        assert!(debug.contains("<REDACTED>"));
        assert!(!debug.contains("secret-token"));
    }

    #[tokio::test]
    async fn test_factory_creation() {
        let factory = FirebaseBlobFactory;

        let config = BlobStoreConfig::Firebase {
            bucket: "bucket.appspot.com".to_string(),
            auth_token: None,
        };

        let store = factory.create(&config).await;
        assert!(store.is_ok());
        assert_eq!(store.unwrap().store_name(), "firebase");
    }
}
