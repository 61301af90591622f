//! Redis connection pool.

use super::KEY_PREFIX;
use crate::error::StorageError;
use deadpool_redis::{Config, Pool, Runtime};

/// Redis-backed key-value storage.
#[derive(Clone)]
pub struct RedisStorage {
    pub(super) pool: Pool,
    pub(super) prefix: String,
}

impl RedisStorage {
    /// Create a new RedisStorage with connection pool.
    pub fn new(redis_url: &str) -> Result<Self, StorageError> {
        let cfg = Config::from_url(redis_url);
        let pool = cfg.create_pool(Some(Runtime::Tokio1))?;
        Ok(Self {
            pool,
            prefix: KEY_PREFIX.to_string(),
        })
    }

    pub(super) fn namespaced(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}
