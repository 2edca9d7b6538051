use super::*;
use crate::services::mock::{entry, playlist, MockSource};

#[tokio::test]
async fn picks_the_newest_playlist_entry_regardless_of_order() {
    let mut source = MockSource::new();
    source.playlist_items.insert(
        "PLX".to_string(),
        vec![
            entry(Some("vidJan1"), "Run 1", "2024-01-01T10:00:00Z"),
            entry(Some("vidJan3"), "Run 3", "2024-01-03T10:00:00Z"),
            entry(Some("vidJan2"), "Run 2", "2024-01-02T10:00:00Z"),
        ],
    );

    let resolved = resolve_latest_video(&source, "UC123", None, Some("PLX"))
        .await
        .unwrap();
    assert_eq!(resolved.as_deref(), Some("vidJan3"));
}

#[tokio::test]
async fn playlist_of_only_inaccessible_entries_resolves_to_none() {
    let mut source = MockSource::new();
    source.playlist_items.insert(
        "PLX".to_string(),
        vec![
            entry(Some("vid1"), "Private video", "2024-01-01T10:00:00Z"),
            entry(Some("vid2"), "Deleted video", "2024-01-02T10:00:00Z"),
            entry(None, "Run without video reference", "2024-01-03T10:00:00Z"),
        ],
    );

    let resolved = resolve_latest_video(&source, "UC123", None, Some("PLX"))
        .await
        .unwrap();
    assert_eq!(resolved, None);
}

#[tokio::test]
async fn empty_playlist_resolves_to_none() {
    let source = MockSource::new();
    let resolved = resolve_latest_video(&source, "UC123", None, Some("PLX"))
        .await
        .unwrap();
    assert_eq!(resolved, None);
}

#[tokio::test]
async fn discovers_playlist_by_device_name_substring() {
    let mut source = MockSource::new();
    source.playlists.insert(
        "UC123".to_string(),
        vec![
            playlist("PL-A", "Lab A OT-2 feed"),
            playlist("PL-B", "Lab B plate reader"),
        ],
    );
    source.playlist_items.insert(
        "PL-A".to_string(),
        vec![entry(Some("vidA"), "Run", "2024-01-01T10:00:00Z")],
    );

    let resolved = resolve_latest_video(&source, "UC123", Some("OT-2"), None)
        .await
        .unwrap();
    assert_eq!(resolved.as_deref(), Some("vidA"));
}

#[tokio::test]
async fn device_name_match_is_case_insensitive_and_first_wins() {
    let mut source = MockSource::new();
    source.playlists.insert(
        "UC123".to_string(),
        vec![
            playlist("PL-1", "Archive ot-2 (old)"),
            playlist("PL-2", "Current OT-2 feed"),
        ],
    );
    source.playlist_items.insert(
        "PL-1".to_string(),
        vec![entry(Some("vidOld"), "Run", "2024-01-01T10:00:00Z")],
    );

    let resolved = resolve_latest_video(&source, "UC123", Some("OT-2"), None)
        .await
        .unwrap();
    assert_eq!(resolved.as_deref(), Some("vidOld"));
}

#[tokio::test]
async fn unmatched_device_name_is_an_error_not_none() {
    let mut source = MockSource::new();
    source.playlists.insert(
        "UC123".to_string(),
        vec![playlist("PL-B", "Lab B plate reader")],
    );

    let err = resolve_latest_video(&source, "UC123", Some("Nonexistent"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, RefreshError::PlaylistNotFound(name) if name == "Nonexistent"));
}

#[tokio::test]
async fn missing_target_fails_before_any_lookup() {
    let source = MockSource::new();
    let err = resolve_latest_video(&source, "UC123", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, RefreshError::MissingTarget));
    assert_eq!(source.call_count(), 0);
}

#[tokio::test]
async fn explicit_playlist_id_wins_over_device_name() {
    let mut source = MockSource::new();
    // No playlists registered for the channel: going through discovery would
    // fail with PlaylistNotFound.
    source.playlist_items.insert(
        "PLX".to_string(),
        vec![entry(Some("vidX"), "Run", "2024-01-01T10:00:00Z")],
    );

    let resolved = resolve_latest_video(&source, "UC123", Some("OT-2"), Some("PLX"))
        .await
        .unwrap();
    assert_eq!(resolved.as_deref(), Some("vidX"));
}

#[tokio::test]
async fn transient_errors_propagate() {
    let mut source = MockSource::new();
    source.playlist_items.insert("PLX".to_string(), Vec::new());
    source.fail_playlist("PLX");

    let err = resolve_latest_video(&source, "UC123", None, Some("PLX"))
        .await
        .unwrap_err();
    assert!(err.is_transient());
}
