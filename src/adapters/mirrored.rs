//! Primary transport with a key-value fallback.

use crate::error::StorageError;
use crate::ports::storage::DocumentStorage;
use async_trait::async_trait;

/// Reads from `primary`, falling back when it fails. Every successful
/// primary write is mirrored to `fallback`; a failed primary write goes to
/// `fallback` alone.
#[derive(Clone, Debug)]
pub struct MirroredStorage<P, F> {
    primary: P,
    fallback: F,
}

impl<P, F> MirroredStorage<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }

    pub fn primary(&self) -> &P {
        &self.primary
    }

    pub fn fallback(&self) -> &F {
        &self.fallback
    }
}

#[async_trait]
impl<P, F> DocumentStorage for MirroredStorage<P, F>
where
    P: DocumentStorage,
    F: DocumentStorage,
{
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        match self.primary.read(key).await {
            Ok(Some(bytes)) => Ok(Some(bytes)),
            Ok(None) => self.fallback.read(key).await,
            Err(e) => {
                tracing::warn!(key, error = %e, "Primary storage unavailable, reading fallback");
                self.fallback.read(key).await
            }
        }
    }

    async fn write(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        match self.primary.write(key, bytes).await {
            Ok(()) => {
                if let Err(e) = self.fallback.write(key, bytes).await {
                    tracing::warn!(key, error = %e, "Failed to mirror write to fallback storage");
                }
                Ok(())
            }
            Err(e) => {
                tracing::error!(key, error = %e, "Primary storage write failed, writing fallback only");
                self.fallback.write(key, bytes).await
            }
        }
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let primary = self.primary.remove(key).await;
        let fallback = self.fallback.remove(key).await;
        if let Err(e) = &primary {
            tracing::warn!(key, error = %e, "Primary storage could not remove key");
        }
        fallback
    }
}
