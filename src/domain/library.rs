use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Identifier of the playlist that always exists and receives orphaned videos.
pub const DEFAULT_PLAYLIST_ID: &str = "default";

/// Schema version written into every current document.
pub const SCHEMA_VERSION: &str = "2.0";

/// Progress (percent) from which a video counts as watched.
pub const WATCHED_THRESHOLD: f64 = 95.0;

/// Fresh opaque identifier, ordered by creation time with a random tail.
pub fn new_id() -> String {
    Uuid::now_v7().simple().to_string()
}

/// Reads `null` as the type's default. Non-finite numbers are written as
/// `null` by JSON serializers, so stored numbers may come back that way.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    pub id: String,
    pub name: String,
    /// Dense 0-based position within the owning playlist.
    #[serde(default, deserialize_with = "null_as_default")]
    pub sequence: usize,
    /// Seconds, 0 until media metadata is known.
    #[serde(default, deserialize_with = "null_as_default")]
    pub duration: f64,
    /// Percentage in [0, 100].
    #[serde(default, deserialize_with = "null_as_default")]
    pub progress: f64,
    /// Last playback position in seconds.
    #[serde(default, deserialize_with = "null_as_default")]
    pub current_time: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub watched: bool,
    pub added_at: DateTime<Utc>,
    pub playlist_id: String,
}

/// Fields supplied by the caller when importing a video.
#[derive(Debug, Clone, PartialEq)]
pub struct NewVideo {
    pub name: String,
    pub duration: f64,
    pub progress: f64,
    pub current_time: f64,
    pub added_at: DateTime<Utc>,
}

impl NewVideo {
    /// A freshly imported, unwatched video with unknown duration.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            duration: 0.0,
            progress: 0.0,
            current_time: 0.0,
            added_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistRecord {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PlaylistRecord {
    pub fn default_playlist(now: DateTime<Utc>) -> Self {
        Self {
            id: DEFAULT_PLAYLIST_ID.to_string(),
            name: "My Videos".to_string(),
            description: Some("Default playlist for all videos".to_string()),
            color: Some("#3b82f6".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_default(&self) -> bool {
        self.id == DEFAULT_PLAYLIST_ID
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewPlaylist {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
}

/// Partial playlist update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaylistPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub version: String,
    pub last_updated: DateTime<Utc>,
}

/// The whole library: the only unit that is ever persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub videos: Vec<VideoRecord>,
    pub playlists: Vec<PlaylistRecord>,
    pub metadata: Metadata,
}

impl Document {
    /// First-run document: no videos and the default playlist.
    pub fn initial(now: DateTime<Utc>) -> Self {
        Self {
            videos: Vec::new(),
            playlists: vec![PlaylistRecord::default_playlist(now)],
            metadata: Metadata {
                version: SCHEMA_VERSION.to_string(),
                last_updated: now,
            },
        }
    }

    /// Puts the default playlist back if a document lost it.
    /// Returns true when the document changed.
    pub fn ensure_default_playlist(&mut self, now: DateTime<Utc>) -> bool {
        if self.playlists.iter().any(PlaylistRecord::is_default) {
            return false;
        }
        self.playlists.insert(0, PlaylistRecord::default_playlist(now));
        true
    }

    pub fn video(&self, id: &str) -> Option<&VideoRecord> {
        self.videos.iter().find(|v| v.id == id)
    }

    pub fn playlist(&self, id: &str) -> Option<&PlaylistRecord> {
        self.playlists.iter().find(|p| p.id == id)
    }

    pub fn video_count(&self, playlist_id: &str) -> usize {
        self.videos
            .iter()
            .filter(|v| v.playlist_id == playlist_id)
            .count()
    }

    /// Renumbers the videos of one playlist to `0..count`, keeping their
    /// current relative order (ties keep document order).
    ///
    /// Order comes from the existing `sequence` values, not from where the
    /// videos sit in `videos`: a video appended with a high sequence stays
    /// last even if it is stored earlier in the array.
    pub fn resequence(&mut self, playlist_id: &str) {
        let mut members: Vec<usize> = self
            .videos
            .iter()
            .enumerate()
            .filter(|(_, v)| v.playlist_id == playlist_id)
            .map(|(i, _)| i)
            .collect();
        members.sort_by_key(|&i| self.videos[i].sequence);
        for (position, index) in members.into_iter().enumerate() {
            self.videos[index].sequence = position;
        }
    }

    /// Whether every playlist holds sequences forming exactly `0..count`.
    pub fn sequences_are_dense(&self) -> bool {
        let mut owners: Vec<&str> = self.videos.iter().map(|v| v.playlist_id.as_str()).collect();
        owners.sort_unstable();
        owners.dedup();
        owners.into_iter().all(|owner| {
            let mut seqs: Vec<usize> = self
                .videos
                .iter()
                .filter(|v| v.playlist_id == owner)
                .map(|v| v.sequence)
                .collect();
            seqs.sort_unstable();
            seqs.iter().enumerate().all(|(i, &s)| i == s)
        })
    }

    /// Appends a video at the end of `playlist_id`, or of the first playlist
    /// when that id is unknown.
    pub fn add_video(&mut self, video: NewVideo, playlist_id: &str) -> VideoRecord {
        let target = match self.playlist(playlist_id) {
            Some(p) => p.id.clone(),
            None => self
                .playlists
                .first()
                .map(|p| p.id.clone())
                .unwrap_or_else(|| DEFAULT_PLAYLIST_ID.to_string()),
        };
        let record = VideoRecord {
            id: new_id(),
            name: video.name,
            sequence: self.video_count(&target),
            duration: video.duration,
            progress: video.progress,
            current_time: video.current_time,
            watched: video.progress >= WATCHED_THRESHOLD,
            added_at: video.added_at,
            playlist_id: target,
        };
        self.videos.push(record.clone());
        record
    }

    /// Returns false when the id is unknown.
    pub fn set_progress(&mut self, id: &str, progress: f64, current_time: Option<f64>) -> bool {
        let Some(video) = self.videos.iter_mut().find(|v| v.id == id) else {
            return false;
        };
        video.progress = progress;
        if let Some(t) = current_time {
            video.current_time = t;
        }
        video.watched = progress >= WATCHED_THRESHOLD;
        true
    }

    pub fn set_duration(&mut self, id: &str, duration: f64) -> bool {
        let Some(video) = self.videos.iter_mut().find(|v| v.id == id) else {
            return false;
        };
        video.duration = duration;
        true
    }

    pub fn remove_video(&mut self, id: &str) -> Option<VideoRecord> {
        let index = self.videos.iter().position(|v| v.id == id)?;
        let removed = self.videos.remove(index);
        self.resequence(&removed.playlist_id);
        Some(removed)
    }

    pub fn create_playlist(&mut self, playlist: NewPlaylist, now: DateTime<Utc>) -> PlaylistRecord {
        let record = PlaylistRecord {
            id: new_id(),
            name: playlist.name,
            description: playlist.description,
            color: playlist.color,
            created_at: now,
            updated_at: now,
        };
        self.playlists.push(record.clone());
        record
    }

    pub fn update_playlist(
        &mut self,
        id: &str,
        patch: PlaylistPatch,
        now: DateTime<Utc>,
    ) -> Option<PlaylistRecord> {
        let playlist = self.playlists.iter_mut().find(|p| p.id == id)?;
        if let Some(name) = patch.name {
            playlist.name = name;
        }
        if let Some(description) = patch.description {
            playlist.description = Some(description);
        }
        if let Some(color) = patch.color {
            playlist.color = Some(color);
        }
        playlist.updated_at = now;
        Some(playlist.clone())
    }

    /// Deletes a non-default playlist, re-homing its videos at the end of the
    /// default playlist. Returns how many videos were re-homed, or `None`
    /// when nothing was deleted.
    pub fn delete_playlist(&mut self, id: &str) -> Option<usize> {
        if id == DEFAULT_PLAYLIST_ID {
            return None;
        }
        let index = self.playlists.iter().position(|p| p.id == id)?;

        let base = self.video_count(DEFAULT_PLAYLIST_ID);
        let mut moved = 0;
        for video in self.videos.iter_mut().filter(|v| v.playlist_id == id) {
            video.playlist_id = DEFAULT_PLAYLIST_ID.to_string();
            video.sequence += base;
            moved += 1;
        }

        self.playlists.remove(index);
        self.resequence(DEFAULT_PLAYLIST_ID);
        Some(moved)
    }

    /// Moves a video to the end of another playlist. Returns false when the
    /// video or the target playlist is unknown.
    pub fn move_video(&mut self, video_id: &str, target_playlist_id: &str) -> bool {
        if self.playlist(target_playlist_id).is_none() {
            return false;
        }
        let end = self.video_count(target_playlist_id);
        let Some(video) = self.videos.iter_mut().find(|v| v.id == video_id) else {
            return false;
        };
        if video.playlist_id == target_playlist_id {
            return true;
        }

        let source = std::mem::replace(&mut video.playlist_id, target_playlist_id.to_string());
        video.sequence = end;

        self.resequence(&source);
        self.resequence(target_playlist_id);
        true
    }

    /// Videos ascending by sequence, optionally restricted to one playlist.
    pub fn videos_in(&self, playlist_id: Option<&str>) -> Vec<VideoRecord> {
        let mut videos: Vec<VideoRecord> = self
            .videos
            .iter()
            .filter(|v| playlist_id.map_or(true, |p| v.playlist_id == p))
            .cloned()
            .collect();
        videos.sort_by_key(|v| v.sequence);
        videos
    }

    /// Playlists sorted alphabetically by name.
    pub fn playlists_by_name(&self) -> Vec<PlaylistRecord> {
        let mut playlists = self.playlists.clone();
        playlists.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name))
        });
        playlists
    }
}
