//! Songs as documents in the `lyrics` collection. This is the only place that
//! knows the document field names; everything above works with [`Song`].

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Connection;
use serde_json::{json, Value};

use crate::models::{Song, SongDraft};

use super::documents::{get_document, insert_document, query_documents};

/// Collection holding every song document.
pub const SONGS_COLLECTION: &str = "lyrics";
/// Songs are listed by title.
const ORDER_FIELD: &str = "title";

/// Fetch all songs ordered by title (binary collation, so uppercase sorts
/// before lowercase). Documents without a title are skipped.
pub fn fetch_songs(conn: &Connection) -> Result<Vec<Song>> {
    let documents = query_documents(conn, SONGS_COLLECTION, ORDER_FIELD)
        .context("failed to load songs")?;
    Ok(documents
        .iter()
        .map(|(id, data)| song_from_document(id, data))
        .collect())
}

/// Fetch one song by id. `None` when the id is unknown, which happens when
/// `preview` points at a song from another database.
pub fn get_song(conn: &Connection, id: &str) -> Result<Option<Song>> {
    let document = get_document(conn, SONGS_COLLECTION, id).context("failed to load song")?;
    Ok(document.map(|data| song_from_document(id, &data)))
}

/// Insert a brand new song. The draft is validated first so nothing without a
/// title ever reaches the store; the hydrated song is echoed back so callers
/// can update state without re-querying.
pub fn create_song(conn: &Connection, draft: &SongDraft) -> Result<Song> {
    draft.validate()?;

    let created_at = Utc::now();
    let title = draft.title.trim().to_string();
    let data = json!({
        "title": title,
        "altTitle": draft.alternative_title,
        "tamilLyrics": draft.tamil,
        "hindiLyrics": draft.hindi,
        "englishLyrics": draft.english,
        "createdAt": created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
    });

    let id = insert_document(conn, SONGS_COLLECTION, &data).context("failed to insert song")?;
    tracing::info!(id = %id, title = %title, "created song");
    Ok(song_from_document(&id, &data))
}

/// Map a stored document onto a [`Song`]. Documents written by older tooling
/// use bare field names (`alternativeTitle`, `tamil`, ...); the namespaced
/// names win whenever both carry a value.
pub fn song_from_document(id: &str, data: &Value) -> Song {
    Song {
        id: id.to_string(),
        title: text_field(data, "title").unwrap_or_default(),
        alternative_title: preferred_field(data, "altTitle", "alternativeTitle"),
        tamil: preferred_field(data, "tamilLyrics", "tamil"),
        hindi: preferred_field(data, "hindiLyrics", "hindi"),
        english: preferred_field(data, "englishLyrics", "english"),
        created_at: text_field(data, "createdAt")
            .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
            .map(|stamp| stamp.with_timezone(&Utc)),
    }
}

fn preferred_field(data: &Value, namespaced: &str, legacy: &str) -> Option<String> {
    text_field(data, namespaced)
        .filter(|value| !value.is_empty())
        .or_else(|| text_field(data, legacy).filter(|value| !value.is_empty()))
}

fn text_field(data: &Value, key: &str) -> Option<String> {
    data.get(key).and_then(Value::as_str).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespaced_fields_win() {
        let data = json!({
            "title": "Blessed Assurance",
            "altTitle": "Assurance",
            "alternativeTitle": "Old",
            "tamilLyrics": "new tamil",
            "tamil": "old tamil",
        });
        let song = song_from_document("abc", &data);
        assert_eq!(song.alternative_title.as_deref(), Some("Assurance"));
        assert_eq!(song.tamil.as_deref(), Some("new tamil"));
        assert_eq!(song.hindi, None);
    }

    #[test]
    fn legacy_fields_still_load() {
        let data = json!({
            "title": "How Great Thou Art",
            "alternativeTitle": "O Store Gud",
            "english": "O Lord my God",
            "englishLyrics": "",
        });
        let song = song_from_document("xyz", &data);
        assert_eq!(song.alternative_title.as_deref(), Some("O Store Gud"));
        assert_eq!(song.english.as_deref(), Some("O Lord my God"));
        assert_eq!(song.created_at, None);
    }

    #[test]
    fn created_at_parses_when_present() {
        let data = json!({ "title": "T", "createdAt": "2024-03-01T10:00:00.000Z" });
        let song = song_from_document("id", &data);
        assert!(song.created_at.is_some());
    }
}
