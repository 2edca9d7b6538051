use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::error::RefreshError;
use crate::models::{BroadcastDetails, BroadcastState, PlaylistEntry, PlaylistInfo};
use crate::utils::parse_timestamp;
use crate::youtube::VideoSource;

/// Scripted stand-in for the YouTube API, with a call counter for asserting
/// that no lookup happened at all.
#[derive(Default)]
pub struct MockSource {
    /// channel id -> playlists, in API order
    pub playlists: HashMap<String, Vec<PlaylistInfo>>,
    /// playlist id -> entries
    pub playlist_items: HashMap<String, Vec<PlaylistEntry>>,
    /// video id -> broadcast details; absent means "unknown to the API"
    pub details: HashMap<String, BroadcastDetails>,
    /// channel id -> most recent upload
    pub latest_uploads: HashMap<String, String>,
    failing_playlists: Mutex<HashSet<String>>,
    failing_videos: Mutex<HashSet<String>>,
    calls: AtomicUsize,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn fail_playlist(&self, playlist_id: &str) {
        self.failing_playlists.lock().unwrap().insert(playlist_id.to_string());
    }

    pub fn fail_video(&self, video_id: &str) {
        self.failing_videos.lock().unwrap().insert(video_id.to_string());
    }

    pub fn clear_failures(&self) {
        self.failing_playlists.lock().unwrap().clear();
        self.failing_videos.lock().unwrap().clear();
    }

    fn transport_error() -> RefreshError {
        RefreshError::Api("quota exceeded".to_string())
    }
}

pub fn playlist(id: &str, title: &str) -> PlaylistInfo {
    PlaylistInfo {
        id: id.to_string(),
        title: title.to_string(),
    }
}

pub fn entry(video_id: Option<&str>, title: &str, published_at: &str) -> PlaylistEntry {
    PlaylistEntry {
        video_id: video_id.map(String::from),
        title: title.to_string(),
        published_at: parse_timestamp(published_at),
    }
}

pub fn broadcast(state: BroadcastState, actual_end_time: Option<&str>) -> BroadcastDetails {
    BroadcastDetails {
        state,
        published_at: parse_timestamp("2024-01-01T00:00:00Z"),
        actual_start_time: None,
        actual_end_time: actual_end_time.and_then(parse_timestamp),
    }
}

#[async_trait]
impl VideoSource for MockSource {
    async fn list_playlists(&self, channel_id: &str) -> Result<Vec<PlaylistInfo>, RefreshError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.playlists.get(channel_id).cloned().unwrap_or_default())
    }

    async fn list_playlist_items(
        &self,
        playlist_id: &str,
    ) -> Result<Vec<PlaylistEntry>, RefreshError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_playlists.lock().unwrap().contains(playlist_id) {
            return Err(Self::transport_error());
        }
        Ok(self.playlist_items.get(playlist_id).cloned().unwrap_or_default())
    }

    async fn live_details(&self, video_id: &str) -> Result<Option<BroadcastDetails>, RefreshError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_videos.lock().unwrap().contains(video_id) {
            return Err(Self::transport_error());
        }
        Ok(self.details.get(video_id).cloned())
    }

    async fn latest_upload(&self, channel_id: &str) -> Result<Option<String>, RefreshError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.latest_uploads.get(channel_id).cloned())
    }
}
