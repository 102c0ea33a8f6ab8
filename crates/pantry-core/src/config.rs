//! Configuration types for the pantry tracker
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};

/// Main pantry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PantryConfig {
    /// Document store configuration
    pub store: DocumentStoreConfig,

    /// Blob store configuration
    pub blobs: BlobStoreConfig,

    /// Frame source configuration (absent when photo capture is unused)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capture: Option<CaptureConfig>,

    /// Optional engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl PantryConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self {
            store: DocumentStoreConfig::default(),
            blobs: BlobStoreConfig::default(),
            capture: None,
            engine: EngineConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.store.validate()?;
        self.blobs.validate()?;
        if let Some(ref capture) = self.capture {
            capture.validate()?;
        }
        self.engine.validate()?;
        Ok(())
    }
}

impl Default for PantryConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Document store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DocumentStoreConfig {
    /// Firestore REST document store
    Firestore {
        /// Cloud project id
        project_id: String,
        /// Collection holding the item documents
        #[serde(default = "default_collection")]
        collection: String,
        /// Optional bearer token for authenticated projects
        #[serde(default, skip_serializing_if = "Option::is_none")]
        auth_token: Option<String>,
    },

    /// File-based document store (local persistence)
    File {
        /// Path to the store file
        path: String,
    },

    /// In-memory document store (not persistent)
    Memory,

    /// Custom document store
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl DocumentStoreConfig {
    /// Validate the document store configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            DocumentStoreConfig::Firestore {
                project_id,
                collection,
                ..
            } => {
                if project_id.is_empty() {
                    return Err(crate::Error::config("Firestore project id cannot be empty"));
                }
                if collection.is_empty() {
                    return Err(crate::Error::config("Firestore collection cannot be empty"));
                }
                Ok(())
            }
            DocumentStoreConfig::File { path } => {
                if path.is_empty() {
                    return Err(crate::Error::config("File store path cannot be empty"));
                }
                Ok(())
            }
            DocumentStoreConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom document store factory cannot be empty",
                    ));
                }
                if config.is_null() {
                    return Err(crate::Error::config(
                        "Custom document store config cannot be null",
                    ));
                }
                Ok(())
            }
            DocumentStoreConfig::Memory => Ok(()),
        }
    }

    /// Get the store type name
    pub fn type_name(&self) -> &str {
        match self {
            DocumentStoreConfig::Firestore { .. } => "firestore",
            DocumentStoreConfig::File { .. } => "file",
            DocumentStoreConfig::Memory => "memory",
            DocumentStoreConfig::Custom { factory, .. } => factory,
        }
    }
}

impl Default for DocumentStoreConfig {
    fn default() -> Self {
        DocumentStoreConfig::Memory
    }
}

/// Blob store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlobStoreConfig {
    /// Firebase Storage REST blob store
    Firebase {
        /// Storage bucket name
        bucket: String,
        /// Optional bearer token for authenticated buckets
        #[serde(default, skip_serializing_if = "Option::is_none")]
        auth_token: Option<String>,
    },

    /// File-based blob store (objects under a root directory)
    File {
        /// Root directory for stored objects
        root: String,
    },

    /// In-memory blob store (not persistent)
    #[default]
    Memory,

    /// Custom blob store
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl BlobStoreConfig {
    /// Validate the blob store configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            BlobStoreConfig::Firebase { bucket, .. } => {
                if bucket.is_empty() {
                    return Err(crate::Error::config("Firebase bucket cannot be empty"));
                }
                Ok(())
            }
            BlobStoreConfig::File { root } => {
                if root.is_empty() {
                    return Err(crate::Error::config("Blob store root cannot be empty"));
                }
                Ok(())
            }
            BlobStoreConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom blob store factory cannot be empty",
                    ));
                }
                if config.is_null() {
                    return Err(crate::Error::config(
                        "Custom blob store config cannot be null",
                    ));
                }
                Ok(())
            }
            BlobStoreConfig::Memory => Ok(()),
        }
    }

    /// Get the store type name
    pub fn type_name(&self) -> &str {
        match self {
            BlobStoreConfig::Firebase { .. } => "firebase",
            BlobStoreConfig::File { .. } => "file",
            BlobStoreConfig::Memory => "memory",
            BlobStoreConfig::Custom { factory, .. } => factory,
        }
    }
}

/// Frame source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CaptureConfig {
    /// HTTP snapshot source (network cameras exposing a still-frame URL)
    Http {
        /// Snapshot URL returning one JPEG frame per request
        url: String,
        /// Request timeout in seconds
        #[serde(default = "default_capture_timeout_secs")]
        timeout_secs: u64,
    },

    /// Custom frame source
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl CaptureConfig {
    /// Validate the frame source configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            CaptureConfig::Http { url, timeout_secs } => {
                if url.is_empty() {
                    return Err(crate::Error::config("Capture snapshot URL cannot be empty"));
                }
                if *timeout_secs == 0 {
                    return Err(crate::Error::config("Capture timeout must be > 0"));
                }
                Ok(())
            }
            CaptureConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom frame source factory cannot be empty",
                    ));
                }
                if config.is_null() {
                    return Err(crate::Error::config(
                        "Custom frame source config cannot be null",
                    ));
                }
                Ok(())
            }
        }
    }

    /// Get the source type name
    pub fn type_name(&self) -> &str {
        match self {
            CaptureConfig::Http { .. } => "http",
            CaptureConfig::Custom { factory, .. } => factory,
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Capacity of the internal event channel
    ///
    /// When full, new engine events will be dropped (with a warning log).
    /// This prevents unbounded memory growth when no subscriber is
    /// draining the channel.
    ///
    /// Default: 1000 events
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl EngineConfig {
    /// Validate the engine configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_collection() -> String {
    "pantry".to_string()
}

fn default_capture_timeout_secs() -> u64 {
    10
}

fn default_event_channel_capacity() -> usize {
    1000
}
