//! Adapters - Concrete implementations of ports.

pub mod local;
pub mod mirrored;
pub mod remote;

use crate::config::{AppConfig, StorageBackend};
use crate::error::StorageError;
use crate::ports::storage::DocumentStorage;
use local::{FsStorage, MemoryStorage};
use mirrored::MirroredStorage;
use remote::RemoteStorage;

/// Build the storage selected by `config`.
pub fn from_config(config: &AppConfig) -> Result<Box<dyn DocumentStorage>, StorageError> {
    match config.backend {
        StorageBackend::Fs => Ok(Box::new(FsStorage::new(&config.data_dir))),
        StorageBackend::Memory => Ok(Box::new(MemoryStorage::new())),
        StorageBackend::Remote => {
            let remote = RemoteStorage::new(&config.remote_url, config.db_key.clone())?;
            let local = FsStorage::new(&config.data_dir);
            Ok(Box::new(MirroredStorage::new(remote, local)))
        }
        #[cfg(feature = "redis")]
        StorageBackend::Redis => Ok(Box::new(local::redis::RedisStorage::new(&config.redis_url)?)),
        #[cfg(not(feature = "redis"))]
        StorageBackend::Redis => Err(StorageError::Unsupported(
            "built without the redis feature",
        )),
    }
}
