//! Error types shared by the storage adapters and the document store.

use thiserror::Error;

/// Failure of a storage transport (filesystem, key-value, remote endpoint).
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Remote endpoint answered {status}: {message}")]
    Remote { status: u16, message: String },

    #[cfg(feature = "redis")]
    #[error("Redis error: {0}")]
    Redis(String),

    #[error("Operation not supported by this storage: {0}")]
    Unsupported(&'static str),
}

/// Failure of a document store operation.
///
/// Lookups that miss are not errors: they come back as `None` or `false`.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage unavailable: {0}")]
    Storage(#[from] StorageError),

    #[error("Progress must be a finite percentage, got {0}")]
    InvalidProgress(f64),

    #[error("Duration must be a finite, non-negative number of seconds, got {0}")]
    InvalidDuration(f64),

    #[error("Playback position must be a finite, non-negative number of seconds, got {0}")]
    InvalidPlaybackTime(f64),

    #[error("Stored library document is corrupt: {0}")]
    Corrupt(#[source] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
