//! In-memory view of the library for an interactive session.
//!
//! Mirrors what the store holds and keeps the files the user picked in this
//! session. Files are never persisted: after a restart every entry is
//! file-less until [`LibrarySession::attach_files`] matches it up again.

use super::store::DocumentStore;
use crate::domain::library::{
    NewPlaylist, NewVideo, PlaylistPatch, PlaylistRecord, VideoRecord, DEFAULT_PLAYLIST_ID,
};
use crate::error::Result;
use crate::ports::storage::DocumentStorage;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub struct LibrarySession<S> {
    store: DocumentStore<S>,
    videos: Vec<VideoRecord>,
    playlists: Vec<PlaylistRecord>,
    files: HashMap<String, PathBuf>,
    current_playlist: Option<String>,
    current_video: Option<String>,
}

/// Display name for an imported file: its name without the extension.
pub fn display_name(path: &Path) -> String {
    path.file_stem()
        .or_else(|| path.file_name())
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

impl<S> LibrarySession<S>
where
    S: DocumentStorage,
{
    /// Load playlists and video entries; the default playlist becomes current.
    pub async fn open(store: DocumentStore<S>) -> Self {
        let mut session = Self {
            store,
            videos: Vec::new(),
            playlists: Vec::new(),
            files: HashMap::new(),
            current_playlist: None,
            current_video: None,
        };
        session.refresh().await;
        session.current_playlist = session
            .playlists
            .iter()
            .find(|p| p.is_default())
            .or_else(|| session.playlists.first())
            .map(|p| p.id.clone());
        session
    }

    pub fn store(&self) -> &DocumentStore<S> {
        &self.store
    }

    /// Re-read videos and playlists from the store.
    pub async fn refresh(&mut self) {
        let doc = self.store.load().await;
        self.videos = doc.videos_in(None);
        self.playlists = doc.playlists_by_name();

        self.files.retain(|id, _| doc.video(id).is_some());
        if let Some(id) = &self.current_video {
            if doc.video(id).is_none() {
                self.current_video = None;
            }
        }
        if let Some(id) = &self.current_playlist {
            if doc.playlist(id).is_none() {
                self.current_playlist = Some(DEFAULT_PLAYLIST_ID.to_string());
            }
        }
    }

    pub fn videos(&self) -> &[VideoRecord] {
        &self.videos
    }

    pub fn playlists(&self) -> &[PlaylistRecord] {
        &self.playlists
    }

    /// Videos of the current playlist, in sequence order.
    pub fn current_videos(&self) -> Vec<&VideoRecord> {
        let Some(current) = &self.current_playlist else {
            return Vec::new();
        };
        let mut videos: Vec<&VideoRecord> = self
            .videos
            .iter()
            .filter(|v| &v.playlist_id == current)
            .collect();
        videos.sort_by_key(|v| v.sequence);
        videos
    }

    pub fn current_playlist(&self) -> Option<&PlaylistRecord> {
        let id = self.current_playlist.as_deref()?;
        self.playlists.iter().find(|p| p.id == id)
    }

    pub fn set_current_playlist(&mut self, id: &str) -> bool {
        if !self.playlists.iter().any(|p| p.id == id) {
            return false;
        }
        self.current_playlist = Some(id.to_string());
        true
    }

    pub fn current_video(&self) -> Option<&VideoRecord> {
        let id = self.current_video.as_deref()?;
        self.videos.iter().find(|v| v.id == id)
    }

    /// Select a video, or clear the selection with `None`.
    pub fn set_current_video(&mut self, id: Option<&str>) -> bool {
        match id {
            Some(id) if !self.videos.iter().any(|v| v.id == id) => false,
            _ => {
                self.current_video = id.map(str::to_string);
                true
            }
        }
    }

    pub fn file_for(&self, video_id: &str) -> Option<&Path> {
        self.files.get(video_id).map(PathBuf::as_path)
    }

    /// Import files into `playlist_id`, the current playlist, or the default
    /// one, in that order of preference.
    pub async fn add_files(
        &mut self,
        paths: &[PathBuf],
        playlist_id: Option<&str>,
    ) -> Result<Vec<VideoRecord>> {
        let target = playlist_id
            .map(str::to_string)
            .or_else(|| self.current_playlist.clone())
            .unwrap_or_else(|| DEFAULT_PLAYLIST_ID.to_string());

        let mut added = Vec::with_capacity(paths.len());
        for path in paths {
            let record = self
                .store
                .add_video(NewVideo::named(display_name(path)), &target)
                .await?;
            self.files.insert(record.id.clone(), path.clone());
            self.videos.push(record.clone());
            added.push(record);
        }
        Ok(added)
    }

    /// Re-associate files with file-less entries whose name matches the
    /// file stem. Returns how many entries got a file.
    pub fn attach_files(&mut self, paths: &[PathBuf]) -> usize {
        let mut attached = 0;
        for path in paths {
            let name = display_name(path);
            let candidate = self
                .videos
                .iter()
                .find(|v| v.name == name && !self.files.contains_key(&v.id))
                .map(|v| v.id.clone());
            if let Some(id) = candidate {
                self.files.insert(id, path.clone());
                attached += 1;
            }
        }
        attached
    }

    pub async fn remove_video(&mut self, id: &str) -> Result<bool> {
        if self.store.remove_video(id).await?.is_none() {
            return Ok(false);
        }
        self.files.remove(id);
        if self.current_video.as_deref() == Some(id) {
            self.current_video = None;
        }
        self.refresh().await;
        Ok(true)
    }

    pub async fn update_progress(
        &mut self,
        id: &str,
        progress: f64,
        current_time: Option<f64>,
    ) -> Result<bool> {
        if !self.store.update_progress(id, progress, current_time).await? {
            return Ok(false);
        }
        if let Some(fresh) = self.store.get_video(id).await {
            self.replace_video(fresh);
        }
        Ok(true)
    }

    pub async fn set_duration(&mut self, id: &str, seconds: f64) -> Result<bool> {
        if !self.store.update_duration(id, seconds).await? {
            return Ok(false);
        }
        if let Some(video) = self.videos.iter_mut().find(|v| v.id == id) {
            video.duration = seconds;
        }
        Ok(true)
    }

    pub async fn create_playlist(
        &mut self,
        name: &str,
        description: Option<String>,
        color: Option<String>,
    ) -> Result<PlaylistRecord> {
        let record = self
            .store
            .create_playlist(NewPlaylist {
                name: name.to_string(),
                description,
                color,
            })
            .await?;
        self.playlists.push(record.clone());
        Ok(record)
    }

    pub async fn update_playlist(&mut self, id: &str, patch: PlaylistPatch) -> Result<bool> {
        let Some(updated) = self.store.update_playlist(id, patch).await? else {
            return Ok(false);
        };
        if let Some(slot) = self.playlists.iter_mut().find(|p| p.id == id) {
            *slot = updated;
        }
        Ok(true)
    }

    pub async fn delete_playlist(&mut self, id: &str) -> Result<bool> {
        if !self.store.delete_playlist(id).await? {
            return Ok(false);
        }
        self.refresh().await;
        Ok(true)
    }

    pub async fn move_video(&mut self, video_id: &str, target_playlist_id: &str) -> Result<bool> {
        if !self
            .store
            .move_video_to_playlist(video_id, target_playlist_id)
            .await?
        {
            return Ok(false);
        }
        self.refresh().await;
        Ok(true)
    }

    fn replace_video(&mut self, fresh: VideoRecord) {
        if let Some(slot) = self.videos.iter_mut().find(|v| v.id == fresh.id) {
            *slot = fresh;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::local::memory::MemoryStorage;

    async fn session() -> (LibrarySession<MemoryStorage>, MemoryStorage) {
        let storage = MemoryStorage::new();
        let session = LibrarySession::open(DocumentStore::new(storage.clone())).await;
        (session, storage)
    }

    #[test]
    fn test_display_name_strips_extension() {
        assert_eq!(display_name(Path::new("/videos/01 - Intro.mp4")), "01 - Intro");
        assert_eq!(display_name(Path::new("lecture.final.mkv")), "lecture.final");
        assert_eq!(display_name(Path::new("noext")), "noext");
    }

    #[tokio::test]
    async fn test_open_selects_default_playlist() {
        let (session, _) = session().await;
        assert_eq!(session.current_playlist().unwrap().id, DEFAULT_PLAYLIST_ID);
        assert!(session.videos().is_empty());
    }

    #[tokio::test]
    async fn test_add_files_goes_to_current_playlist() {
        let (mut session, _) = session().await;
        let go = session.create_playlist("Go", None, None).await.unwrap();
        assert!(session.set_current_playlist(&go.id));

        let added = session
            .add_files(&[PathBuf::from("a.mp4"), PathBuf::from("b.mp4")], None)
            .await
            .unwrap();

        assert_eq!(added.len(), 2);
        assert!(added.iter().all(|v| v.playlist_id == go.id));
        assert_eq!(session.current_videos().len(), 2);
        assert_eq!(session.file_for(&added[0].id), Some(Path::new("a.mp4")));
    }

    #[tokio::test]
    async fn test_files_are_not_persisted_and_can_be_reattached() {
        let (mut session, storage) = session().await;
        session
            .add_files(&[PathBuf::from("/v/intro.mp4"), PathBuf::from("/v/outro.mp4")], None)
            .await
            .unwrap();

        let mut reopened = LibrarySession::open(DocumentStore::new(storage)).await;
        assert_eq!(reopened.videos().len(), 2);
        assert!(reopened.videos().iter().all(|v| reopened.file_for(&v.id).is_none()));

        let attached = reopened.attach_files(&[
            PathBuf::from("/elsewhere/intro.mp4"),
            PathBuf::from("/elsewhere/unrelated.mp4"),
        ]);
        assert_eq!(attached, 1);
        let intro = reopened.videos().iter().find(|v| v.name == "intro").unwrap();
        assert_eq!(
            reopened.file_for(&intro.id),
            Some(Path::new("/elsewhere/intro.mp4"))
        );
    }

    #[tokio::test]
    async fn test_delete_current_playlist_falls_back_to_default() {
        let (mut session, _) = session().await;
        let go = session.create_playlist("Go", None, None).await.unwrap();
        session.set_current_playlist(&go.id);
        let added = session
            .add_files(&[PathBuf::from("a.mp4")], None)
            .await
            .unwrap();

        assert!(session.delete_playlist(&go.id).await.unwrap());
        assert_eq!(session.current_playlist().unwrap().id, DEFAULT_PLAYLIST_ID);

        let video = session.videos().iter().find(|v| v.id == added[0].id).unwrap();
        assert_eq!(video.playlist_id, DEFAULT_PLAYLIST_ID);
        assert_eq!(session.file_for(&added[0].id), Some(Path::new("a.mp4")));
    }

    #[tokio::test]
    async fn test_progress_and_removal_are_mirrored() {
        let (mut session, _) = session().await;
        let added = session
            .add_files(&[PathBuf::from("a.mp4"), PathBuf::from("b.mp4")], None)
            .await
            .unwrap();
        assert!(session.set_current_video(Some(&added[0].id)));

        assert!(session.update_progress(&added[0].id, 99.0, Some(10.0)).await.unwrap());
        assert!(session.current_video().unwrap().watched);

        assert!(session.remove_video(&added[0].id).await.unwrap());
        assert!(session.current_video().is_none());
        assert_eq!(session.videos().len(), 1);
        assert_eq!(session.videos()[0].sequence, 0);
    }
}
