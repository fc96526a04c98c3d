//! Domain models shared by the stores, the synchronizer and both surfaces.
//! These stay plain data holders; parsing of remote snapshots lives next to
//! the types so every caller applies the same defaults.
//!
//! Two shapes matter on the wire. Songs are JSON documents in the `lyrics`
//! collection and map onto [`Song`]. The broadcast settings are one JSON
//! object under the realtime key `live` and map onto [`BroadcastState`]; its
//! camel-case keys are kept exactly so records written by other controllers
//! stay readable.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::ValidationError;

/// Font size used whenever the shared record is missing a usable value.
pub const DEFAULT_FONT_SIZE: u32 = 20;
/// Smallest font size the controller will publish.
pub const FONT_SIZE_MIN: u32 = 10;
/// Largest font size the controller will publish.
pub const FONT_SIZE_MAX: u32 = 100;
/// Step used by the `+`/`-` font controls.
pub const FONT_SIZE_STEP: i32 = 2;

/// The three lyric languages a song can carry. The declaration order is the
/// order blocks are rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Tamil,
    Hindi,
    English,
}

impl Language {
    /// Every language in render order. Loops over languages go through this
    /// instead of spelling the three out.
    pub const ALL: [Language; 3] = [Language::Tamil, Language::Hindi, Language::English];

    /// Key used in the shared record and the settings file.
    pub fn key(self) -> &'static str {
        match self {
            Language::Tamil => "tamil",
            Language::Hindi => "hindi",
            Language::English => "english",
        }
    }

    /// English name used in headers, filters and status messages.
    pub fn label(self) -> &'static str {
        match self {
            Language::Tamil => "Tamil",
            Language::Hindi => "Hindi",
            Language::English => "English",
        }
    }

    /// Label shown on the control bar, with the script's own name first.
    pub fn native_label(self) -> &'static str {
        match self {
            Language::Tamil => "தமிழ் (Tamil)",
            Language::Hindi => "हिन्दी (Hindi)",
            Language::English => "English",
        }
    }

    /// Wire key holding this language's font size inside `live`.
    pub fn font_size_key(self) -> &'static str {
        match self {
            Language::Tamil => "tamilfontSize",
            Language::Hindi => "hindifontSize",
            Language::English => "englishfontSize",
        }
    }

    /// Cycle through the languages, wrapping around.
    pub fn next(self) -> Self {
        match self {
            Language::Tamil => Language::Hindi,
            Language::Hindi => Language::English,
            Language::English => Language::Tamil,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "tamil" => Ok(Language::Tamil),
            "hindi" => Ok(Language::Hindi),
            "english" => Ok(Language::English),
            other => Err(format!("unknown language '{other}'")),
        }
    }
}

/// How the display arranges the visible language blocks.
///
/// Anything other than the three known names reads back as `TopBottom`, both
/// from the shared record and from the settings file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Alignment {
    #[default]
    TopBottom,
    SideBySide,
    Diagonal,
}

impl Alignment {
    pub fn as_str(self) -> &'static str {
        match self {
            Alignment::TopBottom => "top-bottom",
            Alignment::SideBySide => "side-by-side",
            Alignment::Diagonal => "diagonal",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "side-by-side" => Alignment::SideBySide,
            "diagonal" => Alignment::Diagonal,
            _ => Alignment::TopBottom,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Alignment::TopBottom => "Top-Bottom",
            Alignment::SideBySide => "Side-by-Side",
            Alignment::Diagonal => "Diagonal",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Alignment::TopBottom => Alignment::SideBySide,
            Alignment::SideBySide => Alignment::Diagonal,
            Alignment::Diagonal => Alignment::TopBottom,
        }
    }
}

impl From<String> for Alignment {
    fn from(value: String) -> Self {
        Alignment::parse(&value)
    }
}

impl From<Alignment> for String {
    fn from(value: Alignment) -> Self {
        value.as_str().to_string()
    }
}

/// A song as stored in the document store. Songs are immutable once
/// created; there is no update or delete path.
#[derive(Debug, Clone, PartialEq)]
pub struct Song {
    /// Store-assigned identifier: 20 random alphanumeric characters. This is
    /// what the `preview` key holds when the song is selected for display.
    pub id: String,
    /// Display title and sort key. Never blank for songs created here, though
    /// hand-edited documents may carry anything.
    pub title: String,
    /// Second title searched alongside the first, often the same song's name
    /// in another language.
    pub alternative_title: Option<String>,
    /// Raw Tamil lyrics. Blank lines separate sections.
    pub tamil: Option<String>,
    /// Raw Hindi lyrics, sectioned like `tamil`.
    pub hindi: Option<String>,
    /// Raw English lyrics, sectioned like `tamil`.
    pub english: Option<String>,
    /// Creation time. Missing on documents created by older tooling.
    pub created_at: Option<DateTime<Utc>>,
}

impl Song {
    /// Raw lyric text for one language, if any was entered.
    pub fn lyrics(&self, language: Language) -> Option<&str> {
        match language {
            Language::Tamil => self.tamil.as_deref(),
            Language::Hindi => self.hindi.as_deref(),
            Language::English => self.english.as_deref(),
        }
    }

    /// Whether the song has any non-blank text for `language`.
    pub fn has_lyrics(&self, language: Language) -> bool {
        self.lyrics(language)
            .map(|text| !text.trim().is_empty())
            .unwrap_or(false)
    }

    /// `Title (Alternative)` when an alternative title exists.
    pub fn display_title(&self) -> String {
        match self.alternative_title.as_deref().map(str::trim) {
            Some(alt) if !alt.is_empty() => format!("{} ({alt})", self.title),
            _ => self.title.clone(),
        }
    }
}

/// Unsaved input for a new song, exactly as typed into the form. Empty
/// strings stand for fields left blank; nothing is trimmed until the song is
/// created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SongDraft {
    /// Required. Rejected when empty after trimming.
    pub title: String,
    pub alternative_title: String,
    pub tamil: String,
    pub hindi: String,
    pub english: String,
}

impl SongDraft {
    /// The title is the only required field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::TitleRequired);
        }
        Ok(())
    }

    /// Lyrics typed so far for `language`.
    pub fn lyrics(&self, language: Language) -> &str {
        match language {
            Language::Tamil => &self.tamil,
            Language::Hindi => &self.hindi,
            Language::English => &self.english,
        }
    }

    /// Mutable access for the form's per-language input fields.
    pub fn lyrics_mut(&mut self, language: Language) -> &mut String {
        match language {
            Language::Tamil => &mut self.tamil,
            Language::Hindi => &mut self.hindi,
            Language::English => &mut self.english,
        }
    }
}

/// Shared broadcast configuration stored under the `live` key. Every
/// controller and display mirrors this record; the last write wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastState {
    /// `isLive`. While false the display shows only its placeholder.
    pub is_live: bool,
    /// `alignment`. How the display arranges the visible blocks.
    pub alignment: Alignment,
    /// `visible_langs`. De-duplicated. The controller never publishes an
    /// empty list, but an empty list read from the store is kept as is.
    pub visible_languages: Vec<Language>,
    /// `tamilfontSize`. Always positive once parsed.
    pub tamil_font_size: u32,
    /// `hindifontSize`.
    pub hindi_font_size: u32,
    /// `englishfontSize`.
    pub english_font_size: u32,
    /// `currentIndex`. Zero-based section shown for every language at once.
    /// Not bounded by the song's section count; out-of-range indexes simply
    /// show nothing.
    pub current_index: usize,
}

impl Default for BroadcastState {
    fn default() -> Self {
        Self {
            is_live: false,
            alignment: Alignment::TopBottom,
            visible_languages: Language::ALL.to_vec(),
            tamil_font_size: DEFAULT_FONT_SIZE,
            hindi_font_size: DEFAULT_FONT_SIZE,
            english_font_size: DEFAULT_FONT_SIZE,
            current_index: 0,
        }
    }
}

impl BroadcastState {
    /// Build a state from a remote snapshot, substituting the default for
    /// every field that is missing or has the wrong shape.
    pub fn from_value(value: &Value) -> Self {
        let defaults = Self::default();
        let Some(map) = value.as_object() else {
            return defaults;
        };

        let visible_languages = match map.get("visible_langs").and_then(Value::as_array) {
            Some(items) => normalize_languages(
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .filter_map(|key| key.parse().ok()),
            ),
            None => defaults.visible_languages.clone(),
        };

        Self {
            is_live: map.get("isLive").and_then(Value::as_bool).unwrap_or(false),
            alignment: map
                .get("alignment")
                .and_then(Value::as_str)
                .map(Alignment::parse)
                .unwrap_or_default(),
            visible_languages,
            tamil_font_size: font_size_field(map, Language::Tamil),
            hindi_font_size: font_size_field(map, Language::Hindi),
            english_font_size: font_size_field(map, Language::English),
            current_index: map
                .get("currentIndex")
                .and_then(Value::as_u64)
                .map(|index| index as usize)
                .unwrap_or(0),
        }
    }

    /// Serialize with the wire keys the display and other controllers read.
    pub fn to_value(&self) -> Value {
        json!({
            "isLive": self.is_live,
            "alignment": self.alignment.as_str(),
            "visible_langs": self
                .visible_languages
                .iter()
                .map(|language| language.key())
                .collect::<Vec<_>>(),
            "tamilfontSize": self.tamil_font_size,
            "hindifontSize": self.hindi_font_size,
            "englishfontSize": self.english_font_size,
            "currentIndex": self.current_index,
        })
    }

    /// Published font size for `language`.
    pub fn font_size(&self, language: Language) -> u32 {
        match language {
            Language::Tamil => self.tamil_font_size,
            Language::Hindi => self.hindi_font_size,
            Language::English => self.english_font_size,
        }
    }

    pub fn is_visible(&self, language: Language) -> bool {
        self.visible_languages.contains(&language)
    }
}

/// A partial change to [`BroadcastState`]. `None` means "keep what the local
/// state already has".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastUpdate {
    pub is_live: Option<bool>,
    pub alignment: Option<Alignment>,
    pub visible_languages: Option<Vec<Language>>,
    pub tamil_font_size: Option<u32>,
    pub hindi_font_size: Option<u32>,
    pub english_font_size: Option<u32>,
    pub current_index: Option<usize>,
}

impl BroadcastUpdate {
    pub fn live(is_live: bool) -> Self {
        Self {
            is_live: Some(is_live),
            ..Self::default()
        }
    }

    pub fn alignment(alignment: Alignment) -> Self {
        Self {
            alignment: Some(alignment),
            ..Self::default()
        }
    }

    pub fn visible_languages(languages: Vec<Language>) -> Self {
        Self {
            visible_languages: Some(languages),
            ..Self::default()
        }
    }

    pub fn font_size(language: Language, size: u32) -> Self {
        let mut update = Self::default();
        match language {
            Language::Tamil => update.tamil_font_size = Some(size),
            Language::Hindi => update.hindi_font_size = Some(size),
            Language::English => update.english_font_size = Some(size),
        }
        update
    }

    /// Overlay this update on `base`.
    pub fn merge_into(&self, base: &BroadcastState) -> BroadcastState {
        BroadcastState {
            is_live: self.is_live.unwrap_or(base.is_live),
            alignment: self.alignment.unwrap_or(base.alignment),
            visible_languages: self
                .visible_languages
                .clone()
                .map(normalize_languages)
                .unwrap_or_else(|| base.visible_languages.clone()),
            tamil_font_size: self.tamil_font_size.unwrap_or(base.tamil_font_size),
            hindi_font_size: self.hindi_font_size.unwrap_or(base.hindi_font_size),
            english_font_size: self.english_font_size.unwrap_or(base.english_font_size),
            current_index: self.current_index.unwrap_or(base.current_index),
        }
    }
}

/// Clamp a requested font size into the range the controller publishes.
pub fn clamp_font_size(size: i64) -> u32 {
    size.clamp(FONT_SIZE_MIN as i64, FONT_SIZE_MAX as i64) as u32
}

fn font_size_field(map: &Map<String, Value>, language: Language) -> u32 {
    map.get(language.font_size_key())
        .and_then(Value::as_u64)
        .filter(|size| *size > 0)
        .and_then(|size| u32::try_from(size).ok())
        .unwrap_or(DEFAULT_FONT_SIZE)
}

/// De-duplicate while keeping first-seen order.
fn normalize_languages<I>(languages: I) -> Vec<Language>
where
    I: IntoIterator<Item = Language>,
{
    let mut seen = Vec::with_capacity(Language::ALL.len());
    for language in languages {
        if !seen.contains(&language) {
            seen.push(language);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let state = BroadcastState::from_value(&json!({ "isLive": true }));
        assert!(state.is_live);
        assert_eq!(state.alignment, Alignment::TopBottom);
        assert_eq!(state.visible_languages, Language::ALL.to_vec());
        assert_eq!(state.tamil_font_size, 20);
        assert_eq!(state.hindi_font_size, 20);
        assert_eq!(state.english_font_size, 20);
        assert_eq!(state.current_index, 0);
    }

    #[test]
    fn malformed_fields_are_tolerated() {
        let state = BroadcastState::from_value(&json!({
            "isLive": "yes",
            "alignment": "upside-down",
            "visible_langs": ["english", "klingon", "english"],
            "tamilfontSize": 0,
            "hindifontSize": "big",
            "englishfontSize": 36,
            "currentIndex": -3,
        }));
        assert!(!state.is_live);
        assert_eq!(state.alignment, Alignment::TopBottom);
        assert_eq!(state.visible_languages, vec![Language::English]);
        assert_eq!(state.tamil_font_size, 20);
        assert_eq!(state.hindi_font_size, 20);
        assert_eq!(state.english_font_size, 36);
        assert_eq!(state.current_index, 0);
    }

    #[test]
    fn non_object_snapshot_yields_defaults() {
        assert_eq!(
            BroadcastState::from_value(&json!("live")),
            BroadcastState::default()
        );
    }

    #[test]
    fn wire_round_trip_preserves_every_field() {
        let state = BroadcastState {
            is_live: true,
            alignment: Alignment::Diagonal,
            visible_languages: vec![Language::Hindi, Language::Tamil],
            tamil_font_size: 44,
            hindi_font_size: 12,
            english_font_size: 90,
            current_index: 7,
        };
        assert_eq!(BroadcastState::from_value(&state.to_value()), state);
    }

    #[test]
    fn merge_keeps_previous_local_values() {
        let base = BroadcastState {
            alignment: Alignment::SideBySide,
            tamil_font_size: 30,
            current_index: 4,
            ..BroadcastState::default()
        };
        let merged = BroadcastUpdate::live(true).merge_into(&base);
        assert!(merged.is_live);
        assert_eq!(merged.alignment, Alignment::SideBySide);
        assert_eq!(merged.tamil_font_size, 30);
        assert_eq!(merged.current_index, 4);
    }

    #[test]
    fn unknown_alignment_falls_back() {
        assert_eq!(Alignment::parse("diagonal"), Alignment::Diagonal);
        assert_eq!(Alignment::parse("Diagonal"), Alignment::TopBottom);
        assert_eq!(Alignment::parse(""), Alignment::TopBottom);
    }

    #[test]
    fn font_sizes_clamp_to_published_range() {
        assert_eq!(clamp_font_size(4), FONT_SIZE_MIN);
        assert_eq!(clamp_font_size(64), 64);
        assert_eq!(clamp_font_size(400), FONT_SIZE_MAX);
    }

    #[test]
    fn draft_requires_title() {
        let mut draft = SongDraft::default();
        assert_eq!(draft.validate(), Err(ValidationError::TitleRequired));
        draft.title = "   ".to_string();
        assert_eq!(draft.validate(), Err(ValidationError::TitleRequired));
        draft.title = "Amazing Grace".to_string();
        assert!(draft.validate().is_ok());
    }
}
