use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::error::RefreshError;
use crate::models::{BroadcastDetails, BroadcastState, PlaylistEntry, PlaylistInfo};
use crate::utils::parse_timestamp;

const API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// Read-only view of the video platform: the four lookups the refresh engine
/// needs. Production uses [`YouTubeClient`]; tests script their own source.
#[async_trait]
pub trait VideoSource: Send + Sync {
    /// Playlists owned by a channel, in API-returned order.
    async fn list_playlists(&self, channel_id: &str) -> Result<Vec<PlaylistInfo>, RefreshError>;

    /// Most recent entries of a playlist (first page only).
    async fn list_playlist_items(
        &self,
        playlist_id: &str,
    ) -> Result<Vec<PlaylistEntry>, RefreshError>;

    /// Live-broadcast metadata for one video; `None` when the API no longer
    /// returns the id at all.
    async fn live_details(&self, video_id: &str) -> Result<Option<BroadcastDetails>, RefreshError>;

    /// The channel's single most recent upload by date, via search.
    async fn latest_upload(&self, channel_id: &str) -> Result<Option<String>, RefreshError>;
}

pub struct YouTubeClient {
    client: Client,
    api_key: Option<String>,
}

impl YouTubeClient {
    pub fn new(api_key: Option<String>) -> Self {
        YouTubeClient {
            client: Client::new(),
            api_key,
        }
    }

    async fn get_json(&self, url: &str) -> Result<Value, RefreshError> {
        // Checked before anything goes over the wire.
        let api_key = self.api_key.as_deref().ok_or(RefreshError::MissingApiKey)?;

        let response = self.client.get(url).query(&[("key", api_key)]).send().await?;
        let status = response.status();
        let body: Value = response.json().await?;

        // Quota and access problems come back as a JSON error document.
        if let Some(message) = body["error"]["message"].as_str() {
            return Err(RefreshError::Api(message.to_string()));
        }
        if !status.is_success() {
            return Err(RefreshError::Api(format!("HTTP {status}")));
        }

        Ok(body)
    }
}

#[async_trait]
impl VideoSource for YouTubeClient {
    async fn list_playlists(&self, channel_id: &str) -> Result<Vec<PlaylistInfo>, RefreshError> {
        // https://developers.google.com/youtube/v3/docs/playlists
        let url =
            format!("{API_BASE}/playlists?part=snippet&channelId={channel_id}&maxResults=1000");
        let response = self.get_json(&url).await?;

        let mut playlists = Vec::new();
        if let Some(items) = response["items"].as_array() {
            for item in items {
                if let (Some(id), Some(title)) =
                    (item["id"].as_str(), item["snippet"]["title"].as_str())
                {
                    playlists.push(PlaylistInfo {
                        id: id.to_string(),
                        title: title.to_string(),
                    });
                }
            }
        }
        Ok(playlists)
    }

    async fn list_playlist_items(
        &self,
        playlist_id: &str,
    ) -> Result<Vec<PlaylistEntry>, RefreshError> {
        // https://developers.google.com/youtube/v3/docs/playlistItems
        let url = format!(
            "{API_BASE}/playlistItems?part=snippet,contentDetails&playlistId={playlist_id}&maxResults=10"
        );
        let response = self.get_json(&url).await?;

        let mut entries = Vec::new();
        if let Some(items) = response["items"].as_array() {
            for item in items {
                entries.push(PlaylistEntry {
                    video_id: item["snippet"]["resourceId"]["videoId"]
                        .as_str()
                        .map(String::from),
                    title: item["snippet"]["title"].as_str().unwrap_or("").to_string(),
                    published_at: item["snippet"]["publishedAt"]
                        .as_str()
                        .and_then(parse_timestamp),
                });
            }
        }
        Ok(entries)
    }

    async fn live_details(&self, video_id: &str) -> Result<Option<BroadcastDetails>, RefreshError> {
        // https://developers.google.com/youtube/v3/docs/videos
        let url = format!("{API_BASE}/videos?part=snippet,liveStreamingDetails&id={video_id}");
        let response = self.get_json(&url).await?;

        let item = &response["items"][0];
        if item.is_null() {
            return Ok(None);
        }

        let live = &item["liveStreamingDetails"];
        Ok(Some(BroadcastDetails {
            state: BroadcastState::parse(
                item["snippet"]["liveBroadcastContent"].as_str().unwrap_or("none"),
            ),
            published_at: item["snippet"]["publishedAt"].as_str().and_then(parse_timestamp),
            actual_start_time: live["actualStartTime"].as_str().and_then(parse_timestamp),
            actual_end_time: live["actualEndTime"].as_str().and_then(parse_timestamp),
        }))
    }

    async fn latest_upload(&self, channel_id: &str) -> Result<Option<String>, RefreshError> {
        // https://developers.google.com/youtube/v3/docs/search/list
        let url = format!(
            "{API_BASE}/search?part=snippet&channelId={channel_id}&maxResults=1&order=date&type=video"
        );
        let response = self.get_json(&url).await?;

        Ok(response["items"][0]["id"]["videoId"].as_str().map(String::from))
    }
}
