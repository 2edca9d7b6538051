use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RefreshError;
use crate::utils::extract_video_id;

/// One grid entry. `id` is unique across the collection and `kind` never
/// changes after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stream {
    pub id: String,
    pub title: String,
    #[serde(flatten)]
    pub source: StreamSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum StreamSource {
    /// A fixed video link; the video id is derived from the URL once.
    Static {
        url: String,
        video_id: Option<String>,
    },
    LivePlaylist(LivePlaylist),
}

/// A tracked external playlist whose most recent video is periodically
/// re-resolved. The refresh engine may only ever write `video_id` and
/// `last_updated`; the rest belongs to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LivePlaylist {
    pub channel_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playlist_id: Option<String>,
    /// Unresolved until the first successful refresh.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Stream {
    pub fn new_static(id: impl Into<String>, title: impl Into<String>, url: String) -> Self {
        let video_id = extract_video_id(&url);
        Stream {
            id: id.into(),
            title: title.into(),
            source: StreamSource::Static { url, video_id },
        }
    }

    /// Fails when the playlist names neither a device name nor a playlist id,
    /// so the invariant holds from creation instead of being an unchecked
    /// convention.
    pub fn new_live_playlist(
        id: impl Into<String>,
        title: impl Into<String>,
        playlist: LivePlaylist,
    ) -> Result<Self, RefreshError> {
        if playlist.device_name.is_none() && playlist.playlist_id.is_none() {
            return Err(RefreshError::MissingTarget);
        }
        Ok(Stream {
            id: id.into(),
            title: title.into(),
            source: StreamSource::LivePlaylist(playlist),
        })
    }

    pub fn live_playlist(&self) -> Option<&LivePlaylist> {
        match &self.source {
            StreamSource::LivePlaylist(live) => Some(live),
            StreamSource::Static { .. } => None,
        }
    }

    /// The video id currently on display for this entry, if any.
    pub fn video_id(&self) -> Option<&str> {
        match &self.source {
            StreamSource::Static { video_id, .. } => video_id.as_deref(),
            StreamSource::LivePlaylist(live) => live.video_id.as_deref(),
        }
    }
}

/// Liveness classification of one resolved video, rebuilt on every probe.
/// Absence of a snapshot means the stream was never probed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub is_live: bool,
    pub is_upcoming: bool,
    pub has_ended: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub actual_start_time: Option<DateTime<Utc>>,
    pub actual_end_time: Option<DateTime<Utc>>,
}

impl StatusSnapshot {
    /// Whether the status-check cycle should re-resolve the entry: the video
    /// ended, or it is neither live nor upcoming anymore.
    pub fn needs_refresh(&self) -> bool {
        self.has_ended || (!self.is_live && !self.is_upcoming)
    }
}

/// `liveBroadcastContent` as reported by the videos endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BroadcastState {
    Live,
    Upcoming,
    None,
}

impl BroadcastState {
    pub fn parse(value: &str) -> Self {
        match value {
            "live" => BroadcastState::Live,
            "upcoming" => BroadcastState::Upcoming,
            _ => BroadcastState::None,
        }
    }
}

/// Live-broadcast metadata for a single video.
#[derive(Debug, Clone, PartialEq)]
pub struct BroadcastDetails {
    pub state: BroadcastState,
    pub published_at: Option<DateTime<Utc>>,
    pub actual_start_time: Option<DateTime<Utc>>,
    pub actual_end_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistInfo {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistEntry {
    /// Missing when the playlist item no longer references a resolvable video.
    pub video_id: Option<String>,
    pub title: String,
    pub published_at: Option<DateTime<Utc>>,
}
