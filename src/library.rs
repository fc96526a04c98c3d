//! Client-side filtering of the streamed song list. Filters only ever look at
//! the list already delivered by the subscription.

use std::collections::BTreeSet;

use crate::models::{Language, Song};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SongFilter {
    query: String,
    languages: BTreeSet<Language>,
}

impl SongFilter {
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn languages(&self) -> &BTreeSet<Language> {
        &self.languages
    }

    /// Returns whether `language` is now part of the filter.
    pub fn toggle_language(&mut self, language: Language) -> bool {
        if self.languages.remove(&language) {
            false
        } else {
            self.languages.insert(language);
            true
        }
    }

    pub fn is_active(&self) -> bool {
        !self.query.trim().is_empty() || !self.languages.is_empty()
    }

    /// Case-insensitive substring on title or alternative title, and content
    /// in at least one selected language when any are selected.
    pub fn matches(&self, song: &Song) -> bool {
        let needle = self.query.trim().to_lowercase();
        let text_match = needle.is_empty()
            || song.title.to_lowercase().contains(&needle)
            || song
                .alternative_title
                .as_deref()
                .map(|alt| alt.to_lowercase().contains(&needle))
                .unwrap_or(false);

        let language_match = self.languages.is_empty()
            || self
                .languages
                .iter()
                .any(|language| song.has_lyrics(*language));

        text_match && language_match
    }

    pub fn apply(&self, songs: &[Song]) -> Vec<Song> {
        songs
            .iter()
            .filter(|song| self.matches(song))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(title: &str, alt: Option<&str>, tamil: Option<&str>, english: Option<&str>) -> Song {
        Song {
            id: title.to_lowercase(),
            title: title.to_string(),
            alternative_title: alt.map(str::to_string),
            tamil: tamil.map(str::to_string),
            hindi: None,
            english: english.map(str::to_string),
            created_at: None,
        }
    }

    fn library() -> Vec<Song> {
        vec![
            song("Amazing Grace", None, None, Some("Amazing grace")),
            song("En Meippar", Some("The Lord is my Shepherd"), Some("கர்த்தர்"), None),
            song("Holy Holy", None, Some("   "), None),
        ]
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let filter = SongFilter::default();
        assert_eq!(filter.apply(&library()).len(), 3);
        assert!(!filter.is_active());
    }

    #[test]
    fn text_matches_alternative_title_case_insensitively() {
        let mut filter = SongFilter::default();
        filter.set_query("SHEPHERD");
        let hits = filter.apply(&library());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "En Meippar");
    }

    #[test]
    fn language_filters_combine_with_or() {
        let mut filter = SongFilter::default();
        filter.toggle_language(Language::Tamil);
        let titles: Vec<_> = filter.apply(&library()).into_iter().map(|s| s.title).collect();
        assert_eq!(titles, vec!["En Meippar"]);

        filter.toggle_language(Language::English);
        let titles: Vec<_> = filter.apply(&library()).into_iter().map(|s| s.title).collect();
        assert_eq!(titles, vec!["Amazing Grace", "En Meippar"]);
    }

    #[test]
    fn text_and_language_filters_both_apply() {
        let mut filter = SongFilter::default();
        filter.set_query("holy");
        filter.toggle_language(Language::Tamil);
        assert!(filter.apply(&library()).is_empty());
        assert!(!filter.toggle_language(Language::Tamil));
        assert_eq!(filter.apply(&library()).len(), 1);
    }
}
