use crate::error::StorageError;
use crate::ports::storage::DocumentStorage;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Process-local key-value storage. Clones share the same entries.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an entry without going through the async port.
    pub fn insert(&self, key: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.lock().insert(key.into(), bytes.into());
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.lock().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl DocumentStorage for MemoryStorage {
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.get(key))
    }

    async fn write(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        self.insert(key, bytes);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.lock().remove(key);
        Ok(())
    }
}
