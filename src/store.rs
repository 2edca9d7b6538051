use chrono::{DateTime, Utc};
use log::{error, info};
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use crate::models::{Stream, StreamSource};

/// The only fields the refresh engine is allowed to write back.
#[derive(Debug, Clone)]
pub struct StreamUpdate {
    pub video_id: String,
    pub last_updated: DateTime<Utc>,
}

/// Owns the stream collection and its JSON file. Every mutation rewrites the
/// whole snapshot, so the last writer wins at collection granularity.
pub struct StreamStore {
    path: PathBuf,
    streams: RwLock<Vec<Stream>>,
}

impl StreamStore {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let streams: Vec<Stream> = if path.exists() {
            let raw = fs::read_to_string(path)?;
            serde_json::from_str(&raw)?
        } else {
            Vec::new()
        };
        info!("Loaded {} streams from {}", streams.len(), path.display());

        Ok(StreamStore {
            path: path.to_path_buf(),
            streams: RwLock::new(streams),
        })
    }

    pub async fn list(&self) -> Vec<Stream> {
        self.streams.read().await.clone()
    }

    pub async fn get(&self, id: &str) -> Option<Stream> {
        self.streams.read().await.iter().find(|s| s.id == id).cloned()
    }

    pub async fn add_stream(&self, stream: Stream) -> anyhow::Result<()> {
        let mut streams = self.streams.write().await;
        if streams.iter().any(|s| s.id == stream.id) {
            anyhow::bail!("stream id '{}' already exists", stream.id);
        }
        info!("Adding stream: {} ({})", stream.title, stream.id);
        streams.push(stream);
        self.save(&streams);
        Ok(())
    }

    pub async fn remove_stream(&self, id: &str) -> bool {
        let mut streams = self.streams.write().await;
        let before = streams.len();
        streams.retain(|s| s.id != id);
        let removed = streams.len() < before;
        if removed {
            self.save(&streams);
        }
        removed
    }

    pub async fn set_title(&self, id: &str, title: impl Into<String>) -> bool {
        let mut streams = self.streams.write().await;
        let Some(stream) = streams.iter_mut().find(|s| s.id == id) else {
            return false;
        };
        stream.title = title.into();
        self.save(&streams);
        true
    }

    /// The refresh engine's single mutation path. Writes the resolved video
    /// id and its timestamp on live-playlist entries, nothing else; static
    /// entries and unknown ids are refused.
    pub async fn update_stream(&self, id: &str, update: StreamUpdate) -> bool {
        let mut streams = self.streams.write().await;
        let Some(stream) = streams.iter_mut().find(|s| s.id == id) else {
            return false;
        };
        match &mut stream.source {
            StreamSource::LivePlaylist(live) => {
                live.video_id = Some(update.video_id);
                live.last_updated = Some(update.last_updated);
            }
            StreamSource::Static { .. } => return false,
        }
        self.save(&streams);
        true
    }

    fn save(&self, streams: &[Stream]) {
        if let Some(parent) = self.path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        match serde_json::to_string_pretty(streams) {
            Ok(json) => {
                if let Err(e) = fs::write(&self.path, json) {
                    error!("Failed to save streams to {}: {e}", self.path.display());
                }
            }
            Err(e) => error!("Failed to serialize streams: {e}"),
        }
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
