// # File Document Store
//
// File-based implementation of DocumentStore with crash recovery.
//
// ## Purpose
//
// Provides persistent local storage for deployments that do not use a
// cloud document store. The whole collection lives in one JSON file.
//
// ## Crash Recovery
//
// - Atomic writes: Uses write-then-rename for atomicity
// - Corruption detection: Validates JSON on load
// - Automatic backup: Keeps .backup of last known good state
// - Recovery: Falls back to backup if corruption detected
//
// ## File Format
//
// ```json
// {
//   "version": "1.0",
//   "documents": {
//     "eggs": {
//       "quantity": 3,
//       "imageUrl": "https://example.com/images/eggs.jpg"
//     }
//   }
// }
// ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use crate::Error;
use crate::config::DocumentStoreConfig;
use crate::item::{DocumentPatch, ItemDocument};
use crate::traits::document_store::{DocumentStore, DocumentStoreFactory};

/// Store file format version
/// Used for future migration if format changes
const STORE_FILE_VERSION: &str = "1.0";

/// File-based document store with crash recovery
///
/// Persists the collection to a JSON file with atomic writes and automatic
/// corruption recovery. Every write goes straight to disk.
///
/// # Example
///
/// ```rust,no_run
/// use pantry_core::store::FileDocumentStore;
/// use pantry_core::{DocumentStore, DocumentPatch};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileDocumentStore::new("/var/lib/pantry/pantry.json").await?;
///
///     store.set_merge("eggs", &DocumentPatch::quantity(1)).await?;
///
///     let doc = store.get("eggs").await?;
///     assert_eq!(doc.unwrap().quantity, 1);
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct FileDocumentStore {
    path: PathBuf,
    state: Arc<RwLock<FileState>>,
}

/// Internal state for the file-based store
#[derive(Debug)]
struct FileState {
    documents: HashMap<String, ItemDocument>,
}

/// Serializable store file format
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct StoreFileFormat {
    version: String,
    documents: HashMap<String, ItemDocument>,
}

impl FileDocumentStore {
    /// Create or load a file document store
    ///
    /// This will:
    /// 1. Try to load the existing store file
    /// 2. If corruption is detected, try to load from backup
    /// 3. If both fail, start with an empty collection
    /// 4. Create parent directories if needed
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();

        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    Error::config(format!(
                        "Failed to create store directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let documents = Self::load_with_recovery(&path).await?;

        Ok(Self {
            path,
            state: Arc::new(RwLock::new(FileState { documents })),
        })
    }

    /// Load documents from file with automatic recovery
    ///
    /// Recovery strategy:
    /// 1. Try to load the main store file
    /// 2. If a JSON parse error, try loading the backup
    /// 3. If the backup also fails, start with an empty collection
    async fn load_with_recovery(path: &Path) -> Result<HashMap<String, ItemDocument>, Error> {
        match Self::load(path).await {
            Ok(documents) => {
                tracing::debug!("Loaded store file: {} document(s)", documents.len());
                Ok(documents)
            }
            Err(Error::Json(e)) => {
                tracing::warn!(
                    "Store file appears corrupted: {}. Attempting recovery from backup.",
                    e
                );

                let backup_path = Self::backup_path(path);
                if backup_path.exists() {
                    match Self::load(&backup_path).await {
                        Ok(documents) => {
                            tracing::info!(
                                "Recovered store from backup: {} document(s)",
                                documents.len()
                            );

                            // Restore the corrupted file from backup
                            if let Err(restore_err) =
                                Self::restore_from_backup(path, &backup_path).await
                            {
                                tracing::error!(
                                    "Failed to restore store file from backup: {}",
                                    restore_err
                                );
                            }

                            Ok(documents)
                        }
                        Err(backup_err) => {
                            tracing::error!(
                                "Backup also corrupted: {}. Starting with empty collection.",
                                backup_err
                            );
                            Ok(HashMap::new())
                        }
                    }
                } else {
                    tracing::warn!("No backup file found. Starting with empty collection.");
                    Ok(HashMap::new())
                }
            }
            Err(other) => Err(other),
        }
    }

    /// Load documents from a file
    async fn load(path: &Path) -> Result<HashMap<String, ItemDocument>, Error> {
        if !path.exists() {
            tracing::debug!("Store file does not exist: {}", path.display());
            return Ok(HashMap::new());
        }

        let content = fs::read_to_string(path).await.map_err(|e| {
            Error::store_unavailable(format!(
                "Failed to read store file {}: {}",
                path.display(),
                e
            ))
        })?;

        let store_file: StoreFileFormat = serde_json::from_str(&content)?;

        if store_file.version != STORE_FILE_VERSION {
            tracing::warn!(
                "Store file version mismatch: expected {}, got {}. \
                Attempting to load anyway.",
                STORE_FILE_VERSION,
                store_file.version
            );
        }

        Ok(store_file.documents)
    }

    /// Write the collection to file atomically
    async fn write_state(&self) -> Result<(), Error> {
        let state_guard = self.state.read().await;

        let store_file = StoreFileFormat {
            version: STORE_FILE_VERSION.to_string(),
            documents: state_guard.documents.clone(),
        };
        drop(state_guard);

        let json = serde_json::to_string_pretty(&store_file)?;

        // Write to a temporary file first
        let temp_path = self.temp_path();
        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::store_unavailable(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.write_all(json.as_bytes()).await.map_err(|e| {
                Error::store_unavailable(format!(
                    "Failed to write to temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.flush().await.map_err(|e| {
                Error::store_unavailable(format!(
                    "Failed to flush temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        // Create backup of current file (if it exists)
        if self.path.exists() {
            let backup_path = Self::backup_path(&self.path);
            if let Err(e) = fs::copy(&self.path, &backup_path).await {
                tracing::warn!("Failed to create backup: {}", e);
            }
        }

        // Atomic rename (temp -> actual)
        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::store_unavailable(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        tracing::trace!("Collection written to file: {}", self.path.display());
        Ok(())
    }

    /// Restore the store file from backup
    async fn restore_from_backup(path: &Path, backup_path: &Path) -> Result<(), Error> {
        fs::copy(backup_path, path).await.map_err(|e| {
            Error::store_unavailable(format!(
                "Failed to restore from backup {} to {}: {}",
                backup_path.display(),
                path.display(),
                e
            ))
        })?;

        tracing::info!("Restored store file from backup");
        Ok(())
    }

    /// Get path to temporary file for atomic writes
    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }

    /// Get path to backup file
    fn backup_path(path: &Path) -> PathBuf {
        let mut backup = path.to_path_buf();
        backup.set_extension("backup");
        backup
    }
}

#[async_trait]
impl DocumentStore for FileDocumentStore {
    async fn get(&self, name: &str) -> Result<Option<ItemDocument>, Error> {
        let state_guard = self.state.read().await;
        Ok(state_guard.documents.get(name).cloned())
    }

    async fn set_merge(&self, name: &str, patch: &DocumentPatch) -> Result<(), Error> {
        {
            let mut state_guard = self.state.write().await;
            match state_guard.documents.get_mut(name) {
                Some(doc) => patch.apply_to(doc),
                None => {
                    state_guard
                        .documents
                        .insert(name.to_string(), patch.clone().into_document());
                }
            }
        }

        // Immediate write for durability
        self.write_state().await
    }

    async fn delete(&self, name: &str) -> Result<(), Error> {
        {
            let mut state_guard = self.state.write().await;
            state_guard.documents.remove(name);
        }

        // Immediate write for durability
        self.write_state().await
    }

    async fn list(&self) -> Result<Vec<(String, ItemDocument)>, Error> {
        let state_guard = self.state.read().await;
        Ok(state_guard
            .documents
            .iter()
            .map(|(name, doc)| (name.clone(), doc.clone()))
            .collect())
    }

    fn store_name(&self) -> &'static str {
        "file"
    }
}

/// Factory for [`FileDocumentStore`]
pub struct FileDocumentStoreFactory;

#[async_trait]
impl DocumentStoreFactory for FileDocumentStoreFactory {
    async fn create(
        &self,
        config: &DocumentStoreConfig,
    ) -> Result<Box<dyn DocumentStore>, Error> {
        match config {
            DocumentStoreConfig::File { path } => {
                Ok(Box::new(FileDocumentStore::new(path).await?))
            }
            other => Err(Error::config(format!(
                "file factory cannot build store type {:?}",
                other.type_name()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_file_store_basic() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pantry.json");

        let store = FileDocumentStore::new(&path).await.unwrap();

        // Initially empty
        let docs = store.list().await.unwrap();
        assert_eq!(docs.len(), 0);

        // Create and get
        store
            .set_merge("eggs", &DocumentPatch::quantity(1))
            .await
            .unwrap();

        let doc = store.get("eggs").await.unwrap().unwrap();
        assert_eq!(doc.quantity, 1);

        // Verify file was written
        assert!(path.exists());

        // Load new instance and verify persistence
        let store2 = FileDocumentStore::new(&path).await.unwrap();
        let doc2 = store2.get("eggs").await.unwrap().unwrap();
        assert_eq!(doc2.quantity, 1);
    }

    #[tokio::test]
    async fn test_file_store_corruption_recovery() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pantry.json");

        // Create store and write twice so a backup exists
        let store = FileDocumentStore::new(&path).await.unwrap();
        store
            .set_merge("eggs", &DocumentPatch::quantity(1))
            .await
            .unwrap();
        store
            .set_merge("eggs", &DocumentPatch::quantity(2))
            .await
            .unwrap();

        let backup_path = FileDocumentStore::backup_path(&path);
        assert!(backup_path.exists(), "Backup file should exist after write");

        // Corrupt the store file
        fs::write(&path, b"corrupted json data").await.unwrap();

        // Load should recover from backup (should not error)
        let store2 = FileDocumentStore::new(&path)
            .await
            .expect("recovery from backup should succeed");
        let recovered = store2.get("eggs").await.unwrap();
        // The backup holds the previous state, before the last write
        assert_eq!(
            recovered.map(|d| d.quantity),
            Some(1),
            "Backup should contain previous state, not latest"
        );
    }

    #[tokio::test]
    async fn test_file_store_atomic_write() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pantry.json");

        let store = FileDocumentStore::new(&path).await.unwrap();

        // Write multiple updates rapidly
        for i in 1..=10 {
            store
                .set_merge("eggs", &DocumentPatch::quantity(i))
                .await
                .unwrap();
        }

        // Verify final state is consistent
        let store2 = FileDocumentStore::new(&path).await.unwrap();
        let doc = store2.get("eggs").await.unwrap().unwrap();
        assert_eq!(doc.quantity, 10);
    }

    #[tokio::test]
    async fn test_file_store_delete_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pantry.json");

        let store = FileDocumentStore::new(&path).await.unwrap();
        store
            .set_merge("eggs", &DocumentPatch::quantity(1))
            .await
            .unwrap();
        store.delete("eggs").await.unwrap();

        let store2 = FileDocumentStore::new(&path).await.unwrap();
        assert!(store2.get("eggs").await.unwrap().is_none());
    }
}
