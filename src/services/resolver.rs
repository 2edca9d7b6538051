use log::debug;

use crate::error::RefreshError;
use crate::models::LivePlaylist;
use crate::youtube::VideoSource;

// Placeholder titles the playlistItems endpoint returns for entries whose
// video is no longer accessible.
const PRIVATE_TITLE: &str = "Private video";
const DELETED_TITLE: &str = "Deleted video";

/// Decide which video id currently represents a live playlist.
///
/// Lookup order: the explicit playlist id if given; otherwise the first of
/// the channel's playlists whose title contains the device name
/// (case-insensitive); otherwise the channel's most recent upload. An empty
/// but valid playlist resolves to `Ok(None)` for this cycle, while a device
/// name that matches no playlist is a configuration problem and errors.
pub async fn resolve_latest_video(
    source: &dyn VideoSource,
    channel_id: &str,
    device_name: Option<&str>,
    playlist_id: Option<&str>,
) -> Result<Option<String>, RefreshError> {
    if device_name.is_none() && playlist_id.is_none() {
        return Err(RefreshError::MissingTarget);
    }
    if device_name.is_some() && playlist_id.is_some() {
        debug!("Both device name and playlist id given, using the playlist id");
    }

    let playlist_id = match playlist_id {
        Some(id) => Some(id.to_string()),
        None => match device_name {
            Some(name) => Some(find_playlist_by_device_name(source, channel_id, name).await?),
            None => None,
        },
    };

    if let Some(playlist_id) = playlist_id {
        return latest_in_playlist(source, &playlist_id).await;
    }

    // Unreachable through the validated entry above; kept as a defensive
    // fallback for callers that bypass it.
    source.latest_upload(channel_id).await
}

/// Convenience wrapper over a stored live-playlist entry.
pub async fn resolve_stream(
    source: &dyn VideoSource,
    live: &LivePlaylist,
) -> Result<Option<String>, RefreshError> {
    resolve_latest_video(
        source,
        &live.channel_id,
        live.device_name.as_deref(),
        live.playlist_id.as_deref(),
    )
    .await
}

async fn find_playlist_by_device_name(
    source: &dyn VideoSource,
    channel_id: &str,
    device_name: &str,
) -> Result<String, RefreshError> {
    let wanted = device_name.to_lowercase();
    let playlists = source.list_playlists(channel_id).await?;

    playlists
        .into_iter()
        .find(|playlist| playlist.title.to_lowercase().contains(&wanted))
        .map(|playlist| playlist.id)
        .ok_or_else(|| RefreshError::PlaylistNotFound(device_name.to_string()))
}

async fn latest_in_playlist(
    source: &dyn VideoSource,
    playlist_id: &str,
) -> Result<Option<String>, RefreshError> {
    let items = source.list_playlist_items(playlist_id).await?;

    let mut accessible: Vec<_> = items
        .into_iter()
        .filter(|item| {
            item.video_id.is_some() && item.title != PRIVATE_TITLE && item.title != DELETED_TITLE
        })
        .collect();

    if accessible.is_empty() {
        debug!("No accessible videos in playlist {playlist_id}");
        return Ok(None);
    }

    accessible.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    Ok(accessible.into_iter().next().and_then(|item| item.video_id))
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
