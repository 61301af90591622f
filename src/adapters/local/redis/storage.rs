//! Redis DocumentStorage implementation.

use super::pool::RedisStorage;
use crate::error::StorageError;
use crate::ports::storage::DocumentStorage;
use async_trait::async_trait;
use deadpool_redis::redis::AsyncCommands;

#[async_trait]
impl DocumentStorage for RedisStorage {
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let mut conn = self.pool.get().await?;
        let bytes: Option<Vec<u8>> = conn.get(self.namespaced(key)).await?;
        Ok(bytes)
    }

    async fn write(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let mut conn = self.pool.get().await?;
        conn.set::<_, _, ()>(self.namespaced(key), bytes).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut conn = self.pool.get().await?;
        conn.del::<_, ()>(self.namespaced(key)).await?;
        Ok(())
    }
}
