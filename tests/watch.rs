use std::time::Duration;

use lyrics_live::db::{
    create_song, ensure_schema, watch_songs, watch_value, write_value, LIVE_KEY, PREVIEW_KEY,
};
use lyrics_live::{Alignment, BroadcastState, Language, SongDraft};
use serde_json::json;

const POLL: Duration = Duration::from_millis(20);
const WAIT: Duration = Duration::from_secs(5);

fn draft(title: &str) -> SongDraft {
    SongDraft {
        title: title.into(),
        ..SongDraft::default()
    }
}

#[test]
fn test_songs_subscription_delivers_initial_then_changes() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("lyrics.sqlite");
    let conn = ensure_schema(&db_path).unwrap();
    create_song(&conn, &draft("Oceans")).unwrap();

    let feed = watch_songs(&db_path, POLL).unwrap();
    let initial = feed.recv_timeout(WAIT).unwrap();
    assert_eq!(initial.len(), 1);

    create_song(&conn, &draft("Cornerstone")).unwrap();
    let next = feed.recv_timeout(WAIT).unwrap();
    let titles: Vec<&str> = next.iter().map(|song| song.title.as_str()).collect();
    assert_eq!(titles, vec!["Cornerstone", "Oceans"]);
}

#[test]
fn test_value_subscription_reports_deletes_as_none() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("lyrics.sqlite");
    let conn = ensure_schema(&db_path).unwrap();

    let feed = watch_value(&db_path, PREVIEW_KEY, POLL).unwrap();
    assert_eq!(feed.recv_timeout(WAIT), Some(None));

    write_value(&conn, PREVIEW_KEY, &json!("abc")).unwrap();
    assert_eq!(feed.recv_timeout(WAIT), Some(Some(json!("abc"))));

    write_value(&conn, PREVIEW_KEY, &serde_json::Value::Null).unwrap();
    assert_eq!(feed.recv_timeout(WAIT), Some(None));
}

#[test]
fn test_unrelated_writes_are_not_forwarded() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("lyrics.sqlite");
    let conn = ensure_schema(&db_path).unwrap();

    let feed = watch_value(&db_path, PREVIEW_KEY, POLL).unwrap();
    assert_eq!(feed.recv_timeout(WAIT), Some(None));

    write_value(&conn, "live/isLive", &json!(true)).unwrap();
    assert_eq!(feed.recv_timeout(POLL * 10), None);
}

#[test]
fn test_drop_unsubscribes() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("lyrics.sqlite");
    ensure_schema(&db_path).unwrap();

    let feed = watch_songs(&db_path, Duration::from_secs(60)).unwrap();
    let started = std::time::Instant::now();
    drop(feed);
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[test]
fn test_live_record_round_trips_through_subscription() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("lyrics.sqlite");
    let conn = ensure_schema(&db_path).unwrap();

    let feed = watch_value(&db_path, LIVE_KEY, POLL).unwrap();
    assert_eq!(feed.recv_timeout(WAIT), Some(None));

    let state = BroadcastState {
        is_live: true,
        alignment: Alignment::Diagonal,
        visible_languages: vec![Language::English, Language::Tamil],
        tamil_font_size: 64,
        hindi_font_size: 12,
        english_font_size: 36,
        current_index: 7,
    };
    write_value(&conn, LIVE_KEY, &state.to_value()).unwrap();
    let snapshot = feed.recv_timeout(WAIT).unwrap().unwrap();
    assert_eq!(BroadcastState::from_value(&snapshot), state);

    write_value(&conn, LIVE_KEY, &serde_json::json!({ "isLive": true, "currentIndex": 2 }))
        .unwrap();
    let partial = feed.recv_timeout(WAIT).unwrap().unwrap();
    assert_eq!(
        BroadcastState::from_value(&partial),
        BroadcastState {
            is_live: true,
            current_index: 2,
            ..BroadcastState::default()
        }
    );
}
