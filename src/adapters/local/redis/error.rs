//! Redis error conversions for the local adapter.

use crate::error::StorageError;

pub type RedisError = deadpool_redis::redis::RedisError;
pub type PoolError = deadpool_redis::PoolError;

impl From<RedisError> for StorageError {
    fn from(err: RedisError) -> Self {
        StorageError::Redis(err.to_string())
    }
}

impl From<PoolError> for StorageError {
    fn from(err: PoolError) -> Self {
        StorageError::Redis(format!("Pool error: {}", err))
    }
}

impl From<deadpool_redis::CreatePoolError> for StorageError {
    fn from(err: deadpool_redis::CreatePoolError) -> Self {
        StorageError::Redis(format!("Create pool error: {}", err))
    }
}
