// # HTTP Snapshot Frame Source
//
// This crate provides an HTTP-based frame source for the pantry tracker.
//
// ## Purpose
//
// Most network cameras (and the common IP-webcam phone apps) expose a
// still-frame URL that returns one JPEG per request. This source turns
// that URL into a [`FrameSource`]: one GET per capture, one frame back.
//
// ## Capture Model
//
// Strictly one-shot. No polling, no stream, no retry: a failed request
// surfaces as a capture error and the caller decides whether to try again.
// Abandoning a capture (closing a dialog) is simply never calling
// `capture_frame()`.

use async_trait::async_trait;
use pantry_core::config::CaptureConfig;
use pantry_core::traits::{FrameSource, FrameSourceFactory, JpegImage};
use pantry_core::{Error, Result};
use std::time::Duration;

/// Default timeout for snapshot requests
const DEFAULT_SNAPSHOT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP-based frame source (network camera snapshot URLs)
#[derive(Debug, Clone)]
pub struct HttpFrameSource {
    /// Snapshot URL returning one JPEG frame per request
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpFrameSource {
    /// Create a new HTTP frame source
    ///
    /// # Parameters
    ///
    /// - `url`: Snapshot URL (e.g., "http://192.168.1.20:8080/photo.jpg")
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_timeout(url, DEFAULT_SNAPSHOT_TIMEOUT)
    }

    /// Create with a custom request timeout
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
        }
    }
}

#[async_trait]
impl FrameSource for HttpFrameSource {
    async fn capture_frame(&self) -> Result<JpegImage> {
        tracing::debug!("Requesting snapshot from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::capture(format!("Snapshot request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::capture(format!(
                "Snapshot HTTP error: {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::capture(format!("Failed to read snapshot body: {}", e)))?;

        // JpegImage validates the SOI marker, so a camera that answers
        // with an HTML error page is rejected here rather than uploaded
        JpegImage::from_bytes(bytes.to_vec())
            .map_err(|e| Error::capture(format!("Snapshot is not a JPEG frame: {}", e)))
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}

/// Factory for creating HTTP frame sources
pub struct HttpFrameSourceFactory;

impl FrameSourceFactory for HttpFrameSourceFactory {
    fn create(&self, config: &CaptureConfig) -> Result<Box<dyn FrameSource>> {
        match config {
            CaptureConfig::Http { url, timeout_secs } => {
                if url.is_empty() {
                    return Err(Error::config("Snapshot URL is required"));
                }
                Ok(Box::new(HttpFrameSource::with_timeout(
                    url.clone(),
                    Duration::from_secs(*timeout_secs),
                )))
            }
            _ => Err(Error::config("Invalid config for HTTP frame source")),
        }
    }
}

/// Register the HTTP frame source with a registry
///
/// # Example
///
/// ```rust
/// use pantry_core::StoreRegistry;
///
/// let registry = StoreRegistry::new();
/// pantry_capture_http::register(&registry);
/// ```
pub fn register(registry: &pantry_core::StoreRegistry) {
    registry.register_frame_source("http", Box::new(HttpFrameSourceFactory));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_creation() {
        let factory = HttpFrameSourceFactory;

        let config = CaptureConfig::Http {
            url: "http://192.168.1.20:8080/photo.jpg".to_string(),
            timeout_secs: 10,
        };

        let source = factory.create(&config);
        assert!(source.is_ok());
        assert_eq!(source.unwrap().source_name(), "http");
    }

    #[test]
    fn test_factory_rejects_empty_url() {
        let factory = HttpFrameSourceFactory;

        let config = CaptureConfig::Http {
            url: String::new(),
            timeout_secs: 10,
        };

        assert!(factory.create(&config).is_err());
    }

    #[test]
    fn test_register_adds_the_source() {
        let registry = pantry_core::StoreRegistry::new();
        register(&registry);
        assert!(registry.has_frame_source("http"));
    }
}
