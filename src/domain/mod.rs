//! Domain layer - Pure library logic, no I/O.

// Document model and resequencing
pub mod library;

// Schema shapes and upgrades
pub mod migration;

pub use library::{
    Document, Metadata, NewPlaylist, NewVideo, PlaylistPatch, PlaylistRecord, VideoRecord,
    DEFAULT_PLAYLIST_ID, SCHEMA_VERSION,
};
pub use migration::StoredDocument;
