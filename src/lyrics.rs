//! Text shaping for lyric blocks: splitting into sections and the word
//! capitalization applied when sections are shown.

use crate::models::{Language, Song};

/// Split a lyric block into sections on blank lines.
///
/// A blank line is empty or whitespace-only; any run of them separates two
/// sections. Sections are trimmed and empty ones dropped, so leading and
/// trailing blank lines never produce sections.
pub fn parse_sections(text: Option<&str>) -> Vec<String> {
    let Some(text) = text else {
        return Vec::new();
    };

    let mut sections = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            push_section(&mut sections, &mut current);
        } else {
            current.push(line);
        }
    }
    push_section(&mut sections, &mut current);
    sections
}

fn push_section(sections: &mut Vec<String>, lines: &mut Vec<&str>) {
    if lines.is_empty() {
        return;
    }
    let joined = lines.join("\n");
    lines.clear();
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        sections.push(trimmed.to_string());
    }
}

/// Number of sections `text` splits into.
pub fn section_count(text: &str) -> usize {
    parse_sections(Some(text)).len()
}

/// Uppercase the first character of every word.
///
/// Words are runs of ASCII word characters (`[A-Za-z0-9_]`). Scripts without
/// case, such as Tamil or Devanagari, come back unchanged.
pub fn capitalize_words(text: Option<&str>) -> String {
    let Some(text) = text else {
        return String::new();
    };

    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for ch in text.chars() {
        let is_word = ch.is_ascii_alphanumeric() || ch == '_';
        if is_word && !in_word {
            out.push(ch.to_ascii_uppercase());
        } else {
            out.push(ch);
        }
        in_word = is_word;
    }
    out
}

/// Parsed sections for every language of one song.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SongSections {
    pub tamil: Vec<String>,
    pub hindi: Vec<String>,
    pub english: Vec<String>,
}

impl SongSections {
    pub fn from_song(song: &Song) -> Self {
        Self {
            tamil: parse_sections(song.tamil.as_deref()),
            hindi: parse_sections(song.hindi.as_deref()),
            english: parse_sections(song.english.as_deref()),
        }
    }

    pub fn get(&self, language: Language) -> &[String] {
        match language {
            Language::Tamil => &self.tamil,
            Language::Hindi => &self.hindi,
            Language::English => &self.english,
        }
    }

    /// Section `index` of `language`, if it exists and is non-empty.
    pub fn section(&self, language: Language, index: usize) -> Option<&str> {
        self.get(language)
            .get(index)
            .map(String::as_str)
            .filter(|section| !section.is_empty())
    }

    /// Sections are stepped through in lock-step, so the longest language
    /// decides how many there are.
    pub fn count(&self) -> usize {
        Language::ALL
            .iter()
            .map(|language| self.get(*language).len())
            .max()
            .unwrap_or(0)
    }
}
