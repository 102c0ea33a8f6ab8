// # File Blob Store
//
// File-based implementation of BlobStore.
//
// ## Purpose
//
// Stores uploaded objects as plain files under a root directory, with
// atomic write-then-rename. Public URLs use the `file://` scheme, which a
// local presentation layer can load directly.
//
// ## Layout
//
// The object key maps onto the filesystem: `images/eggs.jpg` lands at
// `{root}/images/eggs.jpg`. Re-uploading to the same key overwrites the
// previous file.

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::Error;
use crate::config::BlobStoreConfig;
use crate::traits::blob_store::{BlobStore, BlobStoreFactory};

/// File-based blob store
#[derive(Debug)]
pub struct FileBlobStore {
    root: PathBuf,
}

impl FileBlobStore {
    /// Create a blob store rooted at the given directory
    ///
    /// The root directory is created if it does not exist.
    pub async fn new<P: AsRef<Path>>(root: P) -> Result<Self, Error> {
        let root = root.as_ref().to_path_buf();

        if !root.exists() {
            fs::create_dir_all(&root).await.map_err(|e| {
                Error::config(format!(
                    "Failed to create blob root {}: {}",
                    root.display(),
                    e
                ))
            })?;
        }

        Ok(Self { root })
    }

    /// Resolve an object key to a path under the root
    ///
    /// Keys must stay inside the root: absolute keys and `..` components
    /// are rejected.
    fn object_path(&self, key: &str) -> Result<PathBuf, Error> {
        let relative = Path::new(key);
        if relative.is_absolute()
            || relative
                .components()
                .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(Error::invalid_input(format!(
                "object key {:?} escapes the blob root",
                key
            )));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for FileBlobStore {
    async fn put_object(&self, key: &str, bytes: &[u8]) -> Result<(), Error> {
        let path = self.object_path(key)?;

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    Error::upload_failed(format!(
                        "Failed to create object directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        // Write to a temporary file first, then rename into place
        let temp_path = path.with_extension("tmp");
        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::upload_failed(format!(
                    "Failed to create temp object {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.write_all(bytes).await.map_err(|e| {
                Error::upload_failed(format!(
                    "Failed to write object {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.flush().await.map_err(|e| {
                Error::upload_failed(format!(
                    "Failed to flush object {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        fs::rename(&temp_path, &path).await.map_err(|e| {
            Error::upload_failed(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            ))
        })?;

        Ok(())
    }

    async fn public_url(&self, key: &str) -> Result<String, Error> {
        let path = self.object_path(key)?;
        if !path.exists() {
            return Err(Error::not_found(format!("no object at key {:?}", key)));
        }
        Ok(format!("file://{}", path.display()))
    }

    fn store_name(&self) -> &'static str {
        "file"
    }
}

/// Factory for [`FileBlobStore`]
pub struct FileBlobStoreFactory;

#[async_trait]
impl BlobStoreFactory for FileBlobStoreFactory {
    async fn create(&self, config: &BlobStoreConfig) -> Result<Box<dyn BlobStore>, Error> {
        match config {
            BlobStoreConfig::File { root } => Ok(Box::new(FileBlobStore::new(root).await?)),
            other => Err(Error::config(format!(
                "file factory cannot build blob store type {:?}",
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
    async fn test_file_blob_store_roundtrip() {
        let dir = tempdir().unwrap();
        let store = FileBlobStore::new(dir.path()).await.unwrap();

        store
            .put_object("images/eggs.jpg", &[0xFF, 0xD8, 0x01])
            .await
            .unwrap();

        let url = store.public_url("images/eggs.jpg").await.unwrap();
        assert!(url.starts_with("file://"));
        assert!(url.ends_with("images/eggs.jpg"));

        let on_disk = std::fs::read(dir.path().join("images/eggs.jpg")).unwrap();
        assert_eq!(on_disk, vec![0xFF, 0xD8, 0x01]);
    }

    #[tokio::test]
    async fn test_file_blob_store_overwrites_same_key() {
        let dir = tempdir().unwrap();
        let store = FileBlobStore::new(dir.path()).await.unwrap();

        store.put_object("images/eggs.jpg", &[1]).await.unwrap();
        store.put_object("images/eggs.jpg", &[2, 3]).await.unwrap();

        let on_disk = std::fs::read(dir.path().join("images/eggs.jpg")).unwrap();
        assert_eq!(on_disk, vec![2, 3]);
    }

    #[tokio::test]
    async fn test_file_blob_store_rejects_escaping_keys() {
        let dir = tempdir().unwrap();
        let store = FileBlobStore::new(dir.path()).await.unwrap();

        let err = store.put_object("../outside.jpg", &[1]).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        let err = store.public_url("/etc/passwd").await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
