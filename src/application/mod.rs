//! Application layer - Services built on the storage port.

// Load-mutate-save operations over the library document
pub mod store;

// In-memory mirror for interactive use
pub mod session;

pub use session::LibrarySession;
pub use store::DocumentStore;
