use crate::error::StorageError;
use async_trait::async_trait;

/// Byte-level persistence for whole documents, addressed by key.
///
/// Implementations never interpret the bytes; the store owns parsing,
/// migration and serialization.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStorage: Send + Sync {
    /// Read the bytes stored under `key`, `None` if nothing is stored
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Overwrite whatever is stored under `key`
    async fn write(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError>;

    /// Erase `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

#[async_trait]
impl<T: DocumentStorage + ?Sized> DocumentStorage for std::sync::Arc<T> {
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        (**self).read(key).await
    }

    async fn write(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        (**self).write(key, bytes).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key).await
    }
}

#[async_trait]
impl<T: DocumentStorage + ?Sized> DocumentStorage for Box<T> {
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        (**self).read(key).await
    }

    async fn write(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        (**self).write(key, bytes).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key).await
    }
}
