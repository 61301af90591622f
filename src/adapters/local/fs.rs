use crate::error::StorageError;
use crate::ports::storage::DocumentStorage;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Stores each key as `<dir>/<key>.json`.
#[derive(Clone, Debug)]
pub struct FsStorage {
    dir: PathBuf,
}

impl FsStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        // Prevent directory traversal
        if key.is_empty() || key.contains("..") || key.contains('/') || key.contains('\\') {
            return Err(StorageError::Unsupported("keys must be plain file names"));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl DocumentStorage for FsStorage {
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
