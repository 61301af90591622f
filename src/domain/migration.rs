//! Schema shapes of persisted documents and the pure upgrades between them.
//!
//! Three shapes are known, each a superset of the previous one:
//! - legacy: `{ videos }`, videos carry no playlist id;
//! - versioned: `{ videos, metadata }`, still no playlists;
//! - current: `{ videos, playlists, metadata }`.

use super::library::{
    null_as_default, Document, Metadata, PlaylistRecord, VideoRecord, DEFAULT_PLAYLIST_ID,
    SCHEMA_VERSION, WATCHED_THRESHOLD,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Video entry as written before playlists existed. Every field may be
/// missing in old data.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyVideo {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sequence: usize,
    #[serde(default, deserialize_with = "null_as_default")]
    pub duration: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub progress: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub current_time: f64,
    #[serde(default)]
    pub watched: Option<bool>,
    #[serde(default)]
    pub added_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub playlist_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacyDocument {
    #[serde(default)]
    pub videos: Vec<LegacyVideo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyMetadata {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VersionedDocument {
    #[serde(default)]
    pub videos: Vec<LegacyVideo>,
    pub metadata: LegacyMetadata,
}

#[derive(Debug, Clone)]
pub enum StoredDocument {
    Legacy(LegacyDocument),
    Versioned(VersionedDocument),
    Current(Document),
}

impl StoredDocument {
    /// Classifies raw JSON by the fields it carries.
    pub fn detect(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let value: serde_json::Value = serde_json::from_slice(bytes)?;
        let present = |key: &str| value.get(key).is_some_and(|v| !v.is_null());

        if present("playlists") {
            Ok(Self::Current(serde_json::from_value(value)?))
        } else if present("metadata") {
            Ok(Self::Versioned(serde_json::from_value(value)?))
        } else {
            Ok(Self::Legacy(serde_json::from_value(value)?))
        }
    }

    pub fn shape(&self) -> &'static str {
        match self {
            Self::Legacy(_) => "legacy",
            Self::Versioned(_) => "versioned",
            Self::Current(_) => "current",
        }
    }

    pub fn is_current(&self) -> bool {
        matches!(self, Self::Current(_))
    }

    /// Upgrades any shape to the current one. A current document only gets
    /// its default playlist restored if it went missing.
    pub fn into_current(self, now: DateTime<Utc>) -> Document {
        match self {
            Self::Legacy(doc) => migrate_legacy(doc, now),
            Self::Versioned(doc) => migrate_versioned(doc, now),
            Self::Current(mut doc) => {
                doc.ensure_default_playlist(now);
                doc
            }
        }
    }
}

/// Legacy → current. Every video lands in the default playlist, whatever
/// it claimed before.
pub fn migrate_legacy(doc: LegacyDocument, now: DateTime<Utc>) -> Document {
    let videos = doc
        .videos
        .into_iter()
        .map(|v| upgrade_video(v, DEFAULT_PLAYLIST_ID.to_string(), now))
        .collect();
    finish(videos, now)
}

/// Versioned → current. Videos keep a playlist id they already carry.
pub fn migrate_versioned(doc: VersionedDocument, now: DateTime<Utc>) -> Document {
    let videos = doc
        .videos
        .into_iter()
        .map(|v| {
            let owner = v
                .playlist_id
                .clone()
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| DEFAULT_PLAYLIST_ID.to_string());
            upgrade_video(v, owner, now)
        })
        .collect();
    finish(videos, now)
}

fn upgrade_video(v: LegacyVideo, playlist_id: String, now: DateTime<Utc>) -> VideoRecord {
    VideoRecord {
        watched: v.watched.unwrap_or(v.progress >= WATCHED_THRESHOLD),
        added_at: v.added_at.unwrap_or(now),
        id: v.id,
        name: v.name,
        sequence: v.sequence,
        duration: v.duration,
        progress: v.progress,
        current_time: v.current_time,
        playlist_id,
    }
}

fn finish(videos: Vec<VideoRecord>, now: DateTime<Utc>) -> Document {
    let mut doc = Document {
        videos,
        playlists: vec![PlaylistRecord::default_playlist(now)],
        metadata: Metadata {
            version: SCHEMA_VERSION.to_string(),
            last_updated: now,
        },
    };

    let mut owners: Vec<String> = doc.videos.iter().map(|v| v.playlist_id.clone()).collect();
    owners.sort_unstable();
    owners.dedup();
    for owner in &owners {
        doc.resequence(owner);
    }
    doc
}
