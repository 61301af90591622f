//! Redis adapter for the key-value fallback.
//!
//! Documents are stored as plain string values under `<prefix><key>`.

mod error;
mod pool;
mod storage;

pub use pool::RedisStorage;

/// Redis key prefix
const KEY_PREFIX: &str = "vidshelf:";
