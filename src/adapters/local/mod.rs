//! Local adapters: filesystem, memory, redis and the HTTP endpoint.

pub mod fs;
pub mod http;
pub mod memory;

#[cfg(feature = "redis")]
pub mod redis;

pub use fs::FsStorage;
pub use http::DocumentEndpoint;
pub use memory::MemoryStorage;
