//! Vidshelf - Offline-first video library tracker
//!
//! Hexagonal Architecture:
//! - domain/: Pure library logic (document model, resequencing, schema migration)
//! - ports/: Trait definitions
//! - adapters/: Concrete implementations (filesystem, memory, redis, HTTP)
//! - application/: Document store and session services
//! - config: Environment configuration
//!
//! # Features
//! - `redis`: Redis-backed key-value storage

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;

// Re-exports for convenience
pub use adapters::local::{DocumentEndpoint, FsStorage, MemoryStorage};
pub use application::{DocumentStore, LibrarySession};
pub use config::AppConfig;
pub use error::{StorageError, StoreError};
