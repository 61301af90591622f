//! Ports - Trait definitions implemented by adapters.

pub mod storage;

pub use storage::DocumentStorage;
