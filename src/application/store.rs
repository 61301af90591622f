use crate::config::AppConfig;
use crate::domain::library::{
    Document, NewPlaylist, NewVideo, PlaylistPatch, PlaylistRecord, VideoRecord,
};
use crate::domain::migration::{migrate_legacy, LegacyDocument, StoredDocument};
use crate::error::{Result, StoreError};
use crate::ports::storage::DocumentStorage;
use chrono::Utc;

/// Single source of truth for videos and playlists.
///
/// Every operation loads the whole document, changes it in memory and
/// writes it back. There is no concurrency control: two stores sharing one
/// storage overwrite each other, last write wins.
pub struct DocumentStore<S> {
    storage: S,
    key: String,
    legacy_key: String,
}

impl<S> DocumentStore<S>
where
    S: DocumentStorage,
{
    pub fn new(storage: S) -> Self {
        Self::with_keys(
            storage,
            AppConfig::DEFAULT_DB_KEY,
            AppConfig::DEFAULT_LEGACY_DB_KEY,
        )
    }

    pub fn with_keys(storage: S, key: impl Into<String>, legacy_key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            legacy_key: legacy_key.into(),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Current document, upgraded to the current schema.
    ///
    /// Never fails: unreadable or corrupt data yields the initial document
    /// (without persisting it over what is stored).
    pub async fn load(&self) -> Document {
        match self.read_current().await {
            Ok(doc) => doc,
            Err(e) => {
                tracing::error!(key = %self.key, error = %e, "Failed to load library document, starting empty");
                Document::initial(Utc::now())
            }
        }
    }

    /// Like [`load`](Self::load), but reports unreadable or corrupt data
    /// instead of replacing it. Mutations build on this so that they never
    /// save over a document they could not read.
    async fn read_current(&self) -> Result<Document> {
        let now = Utc::now();

        if let Some(bytes) = self.storage.read(&self.key).await? {
            let stored = StoredDocument::detect(&bytes).map_err(StoreError::Corrupt)?;
            if !stored.is_current() {
                tracing::info!(shape = stored.shape(), "Upgrading stored library document");
            }
            return Ok(stored.into_current(now));
        }

        if let Some(doc) = self.migrate_legacy_key().await {
            return Ok(doc);
        }

        let mut doc = Document::initial(now);
        if self.save(&mut doc).await.is_ok() {
            tracing::info!(key = %self.key, "Created new library document");
        }
        Ok(doc)
    }

    /// One-time move of a pre-playlist document from the legacy key. The
    /// legacy key is erased only once the upgraded document is persisted.
    async fn migrate_legacy_key(&self) -> Option<Document> {
        let bytes = match self.storage.read(&self.legacy_key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key = %self.legacy_key, error = %e, "Failed to read legacy library document");
                return None;
            }
        };

        let legacy: LegacyDocument = match serde_json::from_slice(&bytes) {
            Ok(legacy) => legacy,
            Err(e) => {
                tracing::warn!(key = %self.legacy_key, error = %e, "Ignoring corrupt legacy library document");
                return None;
            }
        };

        let mut doc = migrate_legacy(legacy, Utc::now());
        if self.save(&mut doc).await.is_err() {
            return Some(doc);
        }
        match self.storage.remove(&self.legacy_key).await {
            Ok(()) => tracing::info!(
                from = %self.legacy_key,
                to = %self.key,
                videos = doc.videos.len(),
                "Migrated legacy library document"
            ),
            Err(e) => tracing::warn!(key = %self.legacy_key, error = %e, "Failed to erase legacy library document"),
        }
        Some(doc)
    }

    /// Stamp `lastUpdated` and overwrite the stored document.
    pub async fn save(&self, doc: &mut Document) -> Result<()> {
        doc.metadata.last_updated = Utc::now();
        let bytes = serde_json::to_vec_pretty(doc).map_err(|e| {
            tracing::error!(error = %e, "Failed to serialize library document");
            StoreError::Storage(e.into())
        })?;
        self.storage.write(&self.key, &bytes).await.map_err(|e| {
            tracing::error!(key = %self.key, error = %e, "Failed to save library document");
            StoreError::Storage(e)
        })
    }

    pub async fn add_video(&self, mut video: NewVideo, playlist_id: &str) -> Result<VideoRecord> {
        check_duration(video.duration)?;
        check_playback_time(video.current_time)?;
        video.progress = checked_progress(video.progress)?;

        let mut doc = self.read_current().await?;
        let record = doc.add_video(video, playlist_id);
        self.save(&mut doc).await?;
        tracing::debug!(id = %record.id, playlist = %record.playlist_id, sequence = record.sequence, "Added video");
        Ok(record)
    }

    /// Returns false (and writes nothing) when the video is unknown.
    pub async fn update_progress(
        &self,
        id: &str,
        progress: f64,
        current_time: Option<f64>,
    ) -> Result<bool> {
        let progress = checked_progress(progress)?;
        if let Some(t) = current_time {
            check_playback_time(t)?;
        }

        let mut doc = self.read_current().await?;
        if !doc.set_progress(id, progress, current_time) {
            return Ok(false);
        }
        self.save(&mut doc).await?;
        Ok(true)
    }

    /// Record the duration once media metadata is known.
    pub async fn update_duration(&self, id: &str, seconds: f64) -> Result<bool> {
        check_duration(seconds)?;
        let mut doc = self.read_current().await?;
        if !doc.set_duration(id, seconds) {
            return Ok(false);
        }
        self.save(&mut doc).await?;
        Ok(true)
    }

    pub async fn remove_video(&self, id: &str) -> Result<Option<VideoRecord>> {
        let mut doc = self.read_current().await?;
        let Some(removed) = doc.remove_video(id) else {
            return Ok(None);
        };
        self.save(&mut doc).await?;
        Ok(Some(removed))
    }

    pub async fn create_playlist(&self, playlist: NewPlaylist) -> Result<PlaylistRecord> {
        let mut doc = self.read_current().await?;
        let record = doc.create_playlist(playlist, Utc::now());
        self.save(&mut doc).await?;
        Ok(record)
    }

    pub async fn update_playlist(
        &self,
        id: &str,
        patch: PlaylistPatch,
    ) -> Result<Option<PlaylistRecord>> {
        let mut doc = self.read_current().await?;
        let Some(record) = doc.update_playlist(id, patch, Utc::now()) else {
            return Ok(None);
        };
        self.save(&mut doc).await?;
        Ok(Some(record))
    }

    /// Refuses the default playlist and unknown ids without writing.
    pub async fn delete_playlist(&self, id: &str) -> Result<bool> {
        let mut doc = self.read_current().await?;
        let Some(rehomed) = doc.delete_playlist(id) else {
            return Ok(false);
        };
        self.save(&mut doc).await?;
        tracing::info!(playlist = %id, rehomed, "Deleted playlist");
        Ok(true)
    }

    pub async fn move_video_to_playlist(&self, video_id: &str, target_playlist_id: &str) -> Result<bool> {
        let mut doc = self.read_current().await?;
        if !doc.move_video(video_id, target_playlist_id) {
            return Ok(false);
        }
        self.save(&mut doc).await?;
        Ok(true)
    }

    pub async fn list_videos(&self, playlist_id: Option<&str>) -> Vec<VideoRecord> {
        self.load().await.videos_in(playlist_id)
    }

    pub async fn list_playlists(&self) -> Vec<PlaylistRecord> {
        self.load().await.playlists_by_name()
    }

    pub async fn get_video(&self, id: &str) -> Option<VideoRecord> {
        self.load().await.video(id).cloned()
    }

    pub async fn get_playlist(&self, id: &str) -> Option<PlaylistRecord> {
        self.load().await.playlist(id).cloned()
    }
}

/// Finite progress clamped to [0, 100].
fn checked_progress(progress: f64) -> Result<f64> {
    if !progress.is_finite() {
        return Err(StoreError::InvalidProgress(progress));
    }
    Ok(progress.clamp(0.0, 100.0))
}

fn check_duration(seconds: f64) -> Result<()> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(StoreError::InvalidDuration(seconds));
    }
    Ok(())
}

fn check_playback_time(seconds: f64) -> Result<()> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(StoreError::InvalidPlaybackTime(seconds));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::local::memory::MemoryStorage;
    use crate::domain::library::DEFAULT_PLAYLIST_ID;
    use crate::error::StorageError;
    use crate::ports::storage::MockDocumentStorage;

    const KEY: &str = "learning_hub_db";
    const LEGACY_KEY: &str = "vidlib_db";

    fn store() -> (DocumentStore<MemoryStorage>, MemoryStorage) {
        let storage = MemoryStorage::new();
        (DocumentStore::new(storage.clone()), storage)
    }

    #[tokio::test]
    async fn test_first_load_persists_initial_document() {
        let (store, storage) = store();
        let doc = store.load().await;

        assert!(doc.videos.is_empty());
        assert!(doc.playlist(DEFAULT_PLAYLIST_ID).is_some());
        assert!(storage.contains(KEY));
    }

    #[tokio::test]
    async fn test_corrupt_document_is_not_overwritten_by_load() {
        let (store, storage) = store();
        storage.insert(KEY, b"{ definitely not json".to_vec());

        let doc = store.load().await;
        assert!(doc.videos.is_empty());
        assert_eq!(storage.get(KEY).unwrap(), b"{ definitely not json".to_vec());
    }

    #[tokio::test]
    async fn test_mutations_refuse_to_replace_corrupt_document() {
        let (store, storage) = store();
        storage.insert(KEY, b"{ definitely not json".to_vec());

        let result = store.add_video(NewVideo::named("a"), DEFAULT_PLAYLIST_ID).await;
        assert!(matches!(result, Err(StoreError::Corrupt(_))));
        assert!(matches!(
            store.create_playlist(NewPlaylist::default()).await,
            Err(StoreError::Corrupt(_))
        ));
        assert_eq!(storage.get(KEY).unwrap(), b"{ definitely not json".to_vec());
    }

    #[tokio::test]
    async fn test_mutations_surface_read_failures_without_writing() {
        let mut mock = MockDocumentStorage::new();
        mock.expect_read()
            .returning(|_| Err(StorageError::Unsupported("offline")));
        mock.expect_write().never();

        let store = DocumentStore::new(mock);
        let result = store.add_video(NewVideo::named("a"), DEFAULT_PLAYLIST_ID).await;
        assert!(matches!(result, Err(StoreError::Storage(_))));
    }

    #[tokio::test]
    async fn test_invalid_playback_time_is_rejected_and_library_kept() {
        let (store, _) = store();
        let a = store
            .add_video(NewVideo::named("a"), DEFAULT_PLAYLIST_ID)
            .await
            .unwrap();
        store
            .add_video(NewVideo::named("b"), DEFAULT_PLAYLIST_ID)
            .await
            .unwrap();

        for time in [f64::NAN, f64::INFINITY, -1.0] {
            assert!(matches!(
                store.update_progress(&a.id, 50.0, Some(time)).await,
                Err(StoreError::InvalidPlaybackTime(_))
            ));
        }

        assert_eq!(store.list_videos(None).await.len(), 2);
        assert_eq!(store.get_video(&a.id).await.unwrap().progress, 0.0);
    }

    #[tokio::test]
    async fn test_add_video_validates_numbers() {
        let (store, _) = store();
        store
            .add_video(NewVideo::named("kept"), DEFAULT_PLAYLIST_ID)
            .await
            .unwrap();

        let infinite = NewVideo {
            duration: f64::INFINITY,
            ..NewVideo::named("a")
        };
        assert!(matches!(
            store.add_video(infinite, DEFAULT_PLAYLIST_ID).await,
            Err(StoreError::InvalidDuration(_))
        ));

        let unknown_position = NewVideo {
            current_time: f64::NAN,
            ..NewVideo::named("b")
        };
        assert!(matches!(
            store.add_video(unknown_position, DEFAULT_PLAYLIST_ID).await,
            Err(StoreError::InvalidPlaybackTime(_))
        ));

        let no_progress = NewVideo {
            progress: f64::NAN,
            ..NewVideo::named("c")
        };
        assert!(matches!(
            store.add_video(no_progress, DEFAULT_PLAYLIST_ID).await,
            Err(StoreError::InvalidProgress(_))
        ));

        let overshoot = NewVideo {
            progress: 180.0,
            ..NewVideo::named("d")
        };
        let added = store.add_video(overshoot, DEFAULT_PLAYLIST_ID).await.unwrap();
        assert_eq!(added.progress, 100.0);
        assert!(added.watched);

        let names: Vec<String> = store.list_videos(None).await.into_iter().map(|v| v.name).collect();
        assert_eq!(names, vec!["kept", "d"]);
    }

    #[tokio::test]
    async fn test_null_numbers_in_stored_document_read_as_zero() {
        let (store, storage) = store();
        let mut stored = serde_json::to_value(Document::initial(Utc::now())).unwrap();
        stored["videos"] = serde_json::json!([
            {
                "id": "a", "name": "Loaded", "sequence": 0, "duration": 300.0,
                "progress": 10.0, "currentTime": 30.0, "watched": false,
                "addedAt": "2024-01-01T00:00:00Z", "playlistId": "default"
            },
            {
                "id": "b", "name": "Pending", "sequence": 1, "duration": null,
                "progress": 0, "currentTime": null, "watched": false,
                "addedAt": "2024-01-01T00:00:00Z", "playlistId": "default"
            }
        ]);
        storage.insert(KEY, serde_json::to_vec(&stored).unwrap());

        let doc = store.load().await;
        assert_eq!(doc.videos.len(), 2);
        assert_eq!(doc.video("b").unwrap().duration, 0.0);
        assert_eq!(doc.video("b").unwrap().current_time, 0.0);

        store
            .add_video(NewVideo::named("c"), DEFAULT_PLAYLIST_ID)
            .await
            .unwrap();
        let names: Vec<String> = store.list_videos(None).await.into_iter().map(|v| v.name).collect();
        assert_eq!(names, vec!["Loaded", "Pending", "c"]);
    }

    #[tokio::test]
    async fn test_legacy_key_is_migrated_once() {
        let (store, storage) = store();
        storage.insert(
            LEGACY_KEY,
            br#"{"videos":[{"id":"a","name":"Intro","sequence":0,"progress":40}]}"#.to_vec(),
        );

        let doc = store.load().await;
        assert_eq!(doc.video("a").unwrap().playlist_id, DEFAULT_PLAYLIST_ID);
        assert!(!storage.contains(LEGACY_KEY));
        assert!(storage.contains(KEY));

        let again = store.load().await;
        assert_eq!(again.videos, doc.videos);
    }

    #[tokio::test]
    async fn test_legacy_key_survives_failed_persist() {
        let mut mock = MockDocumentStorage::new();
        mock.expect_read().returning(|key| {
            if key == LEGACY_KEY {
                Ok(Some(br#"{"videos":[{"id":"a","name":"A"}]}"#.to_vec()))
            } else {
                Ok(None)
            }
        });
        mock.expect_write()
            .returning(|_, _| Err(StorageError::Unsupported("read-only")));
        mock.expect_remove().never();

        let store = DocumentStore::new(mock);
        let doc = store.load().await;
        assert_eq!(doc.videos.len(), 1);
    }

    #[tokio::test]
    async fn test_write_failure_surfaces_as_storage_error() {
        let mut mock = MockDocumentStorage::new();
        mock.expect_read().returning(|_| Ok(None));
        mock.expect_write()
            .returning(|_, _| Err(StorageError::Unsupported("disk full")));

        let store = DocumentStore::new(mock);
        let result = store.add_video(NewVideo::named("a"), DEFAULT_PLAYLIST_ID).await;
        assert!(matches!(result, Err(StoreError::Storage(_))));
    }

    #[tokio::test]
    async fn test_read_failure_falls_back_to_initial_document() {
        let mut mock = MockDocumentStorage::new();
        mock.expect_read()
            .returning(|_| Err(StorageError::Unsupported("offline")));
        mock.expect_write().never();

        let store = DocumentStore::new(mock);
        let playlists = store.list_playlists().await;
        assert_eq!(playlists.len(), 1);
        assert!(playlists[0].is_default());
    }

    #[tokio::test]
    async fn test_unknown_ids_write_nothing() {
        let mut mock = MockDocumentStorage::new();
        let current = serde_json::to_vec(&Document::initial(Utc::now())).unwrap();
        mock.expect_read().returning(move |_| Ok(Some(current.clone())));
        mock.expect_write().never();

        let store = DocumentStore::new(mock);
        assert!(!store.update_progress("nope", 50.0, None).await.unwrap());
        assert!(!store.update_duration("nope", 50.0).await.unwrap());
        assert!(store.remove_video("nope").await.unwrap().is_none());
        assert!(!store.delete_playlist(DEFAULT_PLAYLIST_ID).await.unwrap());
        assert!(!store.delete_playlist("nope").await.unwrap());
        assert!(!store.move_video_to_playlist("nope", DEFAULT_PLAYLIST_ID).await.unwrap());
        assert!(store
            .update_playlist("nope", PlaylistPatch::default())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_update_progress_is_idempotent_and_clamped() {
        let (store, _) = store();
        let video = store
            .add_video(NewVideo::named("a"), DEFAULT_PLAYLIST_ID)
            .await
            .unwrap();

        assert!(store.update_progress(&video.id, 96.0, Some(30.0)).await.unwrap());
        let first = store.get_video(&video.id).await.unwrap();
        assert!(store.update_progress(&video.id, 96.0, Some(30.0)).await.unwrap());
        let second = store.get_video(&video.id).await.unwrap();
        assert_eq!(first, second);
        assert!(second.watched);

        store.update_progress(&video.id, 140.0, None).await.unwrap();
        assert_eq!(store.get_video(&video.id).await.unwrap().progress, 100.0);

        assert!(matches!(
            store.update_progress(&video.id, f64::NAN, None).await,
            Err(StoreError::InvalidProgress(_))
        ));
    }

    #[tokio::test]
    async fn test_update_duration() {
        let (store, _) = store();
        let video = store
            .add_video(NewVideo::named("a"), DEFAULT_PLAYLIST_ID)
            .await
            .unwrap();
        assert_eq!(video.duration, 0.0);

        assert!(store.update_duration(&video.id, 612.5).await.unwrap());
        assert_eq!(store.get_video(&video.id).await.unwrap().duration, 612.5);
        assert!(store.update_duration(&video.id, -1.0).await.is_err());
    }

    #[tokio::test]
    async fn test_save_stamps_last_updated() {
        let (store, _) = store();
        let mut doc = store.load().await;
        let before = doc.metadata.last_updated;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        store.save(&mut doc).await.unwrap();
        assert!(doc.metadata.last_updated > before);
        assert_eq!(store.load().await.metadata.last_updated, doc.metadata.last_updated);
    }
}
