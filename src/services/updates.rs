use chrono::{DateTime, Utc};
use log::{debug, error, info};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::config::{FALLBACK_REFRESH_SCHEDULE, STATUS_CHECK_SCHEDULE};
use crate::models::{StatusSnapshot, Stream};
use crate::services::{prober, resolver};
use crate::store::{StreamStore, StreamUpdate};
use crate::youtube::VideoSource;

/// Updater state as rendered by the UI layer: spinners, timestamps, badges.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateStatus {
    pub is_refreshing: bool,
    pub is_checking_status: bool,
    pub last_update: Option<DateTime<Utc>>,
    pub last_status_check: Option<DateTime<Utc>>,
    /// Failures of the most recent refresh cycle, keyed by stream id.
    pub refresh_errors: HashMap<String, String>,
    pub stream_statuses: HashMap<String, StatusSnapshot>,
}

#[derive(Default)]
struct UpdaterState {
    status: UpdateStatus,
    /// Start time of the refresh cycle whose result each stream last took.
    applied_cycles: HashMap<String, DateTime<Utc>>,
}

/// Keeps the live-playlist entries of a stream store fresh. All mutation
/// goes through the store's update path; the updater never writes the
/// persistence file itself.
pub struct LiveUpdater {
    store: Arc<StreamStore>,
    source: Arc<dyn VideoSource>,
    state: RwLock<UpdaterState>,
}

impl LiveUpdater {
    pub fn new(store: Arc<StreamStore>, source: Arc<dyn VideoSource>) -> Self {
        LiveUpdater {
            store,
            source,
            state: RwLock::new(UpdaterState::default()),
        }
    }

    pub async fn status(&self) -> UpdateStatus {
        self.state.read().await.status.clone()
    }

    async fn live_streams(&self) -> Vec<Stream> {
        self.store
            .list()
            .await
            .into_iter()
            .filter(|s| s.live_playlist().is_some())
            .collect()
    }

    /// One probe cycle over every resolved live-playlist stream. Returns the
    /// streams whose current video is no longer an active broadcast.
    pub async fn check_statuses(&self) -> Vec<Stream> {
        let streams = self.live_streams().await;
        if streams.is_empty() {
            return Vec::new();
        }

        self.state.write().await.status.is_checking_status = true;
        let outcome = prober::probe_streams(self.source.as_ref(), &streams).await;

        let mut state = self.state.write().await;
        // Probed streams take this cycle's snapshot, the rest keep theirs.
        state.status.stream_statuses.extend(outcome.statuses);
        state.status.is_checking_status = false;
        state.status.last_status_check = Some(Utc::now());

        outcome.ended
    }

    /// One refresh cycle over the given streams. The error map is rebuilt
    /// from exactly this cycle's failures, replacing the previous one.
    pub async fn refresh(&self, targets: Vec<Stream>) {
        if targets.is_empty() {
            return;
        }

        let started = Utc::now();
        self.state.write().await.status.is_refreshing = true;

        let mut errors = HashMap::new();
        for stream in &targets {
            let Some(live) = stream.live_playlist() else {
                continue;
            };
            match resolver::resolve_stream(self.source.as_ref(), live).await {
                Ok(Some(video_id)) => self.apply_resolution(stream, video_id, started).await,
                // An empty but valid playlist: nothing to show this cycle.
                Ok(None) => {}
                Err(e) => {
                    error!("Failed to refresh '{}': {e}", stream.title);
                    errors.insert(stream.id.clone(), e.to_string());
                }
            }
        }

        let mut state = self.state.write().await;
        state.status.refresh_errors = errors;
        state.status.is_refreshing = false;
        state.status.last_update = Some(Utc::now());
    }

    /// Status-check cycle: probe first, then refresh only what came back as
    /// ended, so still-live playlists cost no extra lookups. Entries that
    /// were never resolved cannot be probed and get their first resolution
    /// here instead.
    pub async fn smart_refresh(&self) {
        let mut targets = self.check_statuses().await;
        targets.extend(
            self.live_streams()
                .await
                .into_iter()
                .filter(|s| s.video_id().is_none()),
        );

        if targets.is_empty() {
            debug!("No streams have ended, skipping refresh");
            return;
        }
        info!("Found {} streams to refresh", targets.len());
        self.refresh(targets).await;
    }

    /// Unconditional refresh over every live-playlist stream. Backs the
    /// fallback timer and the manual trigger; does not touch the schedules.
    pub async fn refresh_all(&self) {
        let streams = self.live_streams().await;
        self.refresh(streams).await;
    }

    /// User-requested full refresh, independent of the timers.
    pub async fn manual_refresh(&self) {
        info!("Manual refresh requested");
        self.refresh_all().await;
    }

    /// Write a resolved id back unless a later-started cycle already wrote
    /// this stream: when overlapping cycles race, cycle start time wins. An
    /// unchanged id is a successful resolution but writes nothing, so the
    /// stored timestamp only moves when the video actually changes.
    async fn apply_resolution(
        &self,
        stream: &Stream,
        video_id: String,
        cycle_started: DateTime<Utc>,
    ) {
        {
            let mut state = self.state.write().await;
            match state.applied_cycles.get(&stream.id) {
                Some(applied) if *applied > cycle_started => {
                    debug!("Skipping superseded resolution for '{}'", stream.title);
                    return;
                }
                _ => {
                    state.applied_cycles.insert(stream.id.clone(), cycle_started);
                }
            }
        }

        // Re-read the current id: the collection may have changed since the
        // cycle captured its targets.
        let current = self
            .store
            .get(&stream.id)
            .await
            .and_then(|s| s.video_id().map(String::from));

        if current.as_deref() == Some(video_id.as_str()) {
            return;
        }
        info!(
            "Updating '{}': {} -> {}",
            stream.title,
            current.as_deref().unwrap_or("unresolved"),
            video_id
        );
        self.store
            .update_stream(
                &stream.id,
                StreamUpdate {
                    video_id,
                    last_updated: Utc::now(),
                },
            )
            .await;
    }
}

/// Arm the two timers and run the initial check. The status-check job and
/// the fallback job fire independently; overlapping cycles are tolerated by
/// the updater's write rules.
pub async fn setup_live_updates(updater: Arc<LiveUpdater>) -> anyhow::Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let status_updater = updater.clone();
    let status_job = Job::new_async(STATUS_CHECK_SCHEDULE.as_str(), move |_uuid, _l| {
        let updater = status_updater.clone();
        Box::pin(async move {
            updater.smart_refresh().await;
        })
    })?;
    scheduler.add(status_job).await?;

    let fallback_updater = updater.clone();
    let fallback_job = Job::new_async(FALLBACK_REFRESH_SCHEDULE.as_str(), move |_uuid, _l| {
        let updater = fallback_updater.clone();
        Box::pin(async move {
            info!("Fallback refresh: updating all live streams");
            updater.refresh_all().await;
        })
    })?;
    scheduler.add(fallback_job).await?;

    scheduler.start().await?;
    info!("Live update scheduler started.");

    // Streams loaded at startup should not wait a full period for their
    // first check.
    if !updater.live_streams().await.is_empty() {
        let updater = updater.clone();
        tokio::spawn(async move {
            updater.smart_refresh().await;
        });
    }

    Ok(scheduler)
}

#[cfg(test)]
#[path = "updates_tests.rs"]
mod tests;
