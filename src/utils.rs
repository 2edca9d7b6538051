use chrono::{DateTime, Utc};
use url::Url;

/// Parse an ISO8601 date string as returned by the YouTube API.
pub fn parse_timestamp(date_str: &str) -> Option<DateTime<Utc>> {
    if date_str.is_empty() {
        return None;
    }
    date_str.parse::<DateTime<Utc>>().ok()
}

/// Extract the video id from the usual YouTube URL shapes
/// (watch?v=, youtu.be/, /embed/, /live/, /shorts/).
pub fn extract_video_id(input: &str) -> Option<String> {
    let url = Url::parse(input).ok()?;
    let host = url.host_str()?.trim_start_matches("www.");

    match host {
        "youtu.be" => url
            .path_segments()?
            .next()
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        "youtube.com" | "m.youtube.com" => {
            let mut segments = url.path_segments()?;
            match segments.next()? {
                "watch" => url
                    .query_pairs()
                    .find(|(key, _)| key == "v")
                    .map(|(_, value)| value.into_owned()),
                "embed" | "live" | "shorts" => segments
                    .next()
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
                _ => None,
            }
        }
        _ => None,
    }
}
