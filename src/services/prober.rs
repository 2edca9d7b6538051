use chrono::{DateTime, Utc};
use log::{error, info};
use std::collections::HashMap;

use crate::models::{BroadcastDetails, BroadcastState, StatusSnapshot, Stream};
use crate::youtube::VideoSource;

/// A broadcast that finished less than this long ago is still flagged as
/// ended: recency is a proxy for "likely superseded by a new upload soon".
const RECENT_END_SECS: i64 = 60 * 60;

/// Classify one video's broadcast metadata. `None` means the API no longer
/// resolves the id, which forces a re-resolution.
pub fn classify(details: Option<&BroadcastDetails>, now: DateTime<Utc>) -> StatusSnapshot {
    let Some(details) = details else {
        return StatusSnapshot {
            has_ended: true,
            ..StatusSnapshot::default()
        };
    };

    let ended_explicitly =
        details.state == BroadcastState::None && details.actual_end_time.is_some();
    let ended_recently = details
        .actual_end_time
        .map(|end| (now - end).num_seconds() < RECENT_END_SECS)
        .unwrap_or(false);

    StatusSnapshot {
        is_live: details.state == BroadcastState::Live,
        is_upcoming: details.state == BroadcastState::Upcoming,
        has_ended: ended_explicitly || ended_recently,
        published_at: details.published_at,
        actual_start_time: details.actual_start_time,
        actual_end_time: details.actual_end_time,
    }
}

pub struct ProbeOutcome {
    /// Snapshots for the streams actually probed this cycle; callers keep the
    /// previous snapshot for everything else.
    pub statuses: HashMap<String, StatusSnapshot>,
    /// Streams whose current video is no longer an active broadcast.
    pub ended: Vec<Stream>,
}

/// Probe every live-playlist stream that has a resolved video id. Entries
/// that were never resolved cannot be probed and are skipped. A failure for
/// one stream is logged and leaves it out of the ended set for this cycle; it
/// never stops the remaining streams from being probed.
pub async fn probe_streams(source: &dyn VideoSource, streams: &[Stream]) -> ProbeOutcome {
    let now = Utc::now();
    let mut outcome = ProbeOutcome {
        statuses: HashMap::new(),
        ended: Vec::new(),
    };

    for stream in streams {
        let Some(live) = stream.live_playlist() else {
            continue;
        };
        let Some(video_id) = live.video_id.as_deref() else {
            continue;
        };

        match source.live_details(video_id).await {
            Ok(details) => {
                let status = classify(details.as_ref(), now);
                if status.needs_refresh() {
                    info!("Stream '{}' is no longer live, will refresh", stream.title);
                    outcome.ended.push(stream.clone());
                }
                outcome.statuses.insert(stream.id.clone(), status);
            }
            Err(e) => {
                error!("Failed to check status for '{}': {e}", stream.title);
            }
        }
    }

    outcome
}

#[cfg(test)]
#[path = "prober_tests.rs"]
mod tests;
