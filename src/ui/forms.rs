use anyhow::Result;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::lyrics::section_count;
use crate::models::{Language, SongDraft};

/// Lyric lines shown for the focused lyrics field.
const ACTIVE_LYRIC_LINES: usize = 4;
/// Indent in front of lyric lines.
const LYRIC_INDENT: &str = "  ";

/// Fields available within the song form, in focus order.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum SongField {
    #[default]
    Title,
    AlternativeTitle,
    Lyrics(Language),
}

impl SongField {
    const ORDER: [SongField; 5] = [
        SongField::Title,
        SongField::AlternativeTitle,
        SongField::Lyrics(Language::Tamil),
        SongField::Lyrics(Language::Hindi),
        SongField::Lyrics(Language::English),
    ];

    fn position(self) -> usize {
        Self::ORDER
            .iter()
            .position(|field| *field == self)
            .unwrap_or(0)
    }

    fn next(self) -> Self {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    fn previous(self) -> Self {
        let len = Self::ORDER.len();
        Self::ORDER[(self.position() + len - 1) % len]
    }

    pub(crate) fn is_multiline(self) -> bool {
        matches!(self, SongField::Lyrics(_))
    }

    fn prefix(self) -> &'static str {
        match self {
            SongField::Title => "Title: ",
            SongField::AlternativeTitle => "Alternative Title: ",
            SongField::Lyrics(_) => LYRIC_INDENT,
        }
    }
}

/// Form state for creating a song. The draft survives failed saves so the
/// user can retry.
#[derive(Default, Clone)]
pub(crate) struct SongForm {
    pub(crate) draft: SongDraft,
    pub(crate) active: SongField,
    pub(crate) error: Option<String>,
}

impl SongForm {
    pub(crate) fn next_field(&mut self) {
        self.active = self.active.next();
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = self.active.previous();
    }

    fn value_mut(&mut self, field: SongField) -> &mut String {
        match field {
            SongField::Title => &mut self.draft.title,
            SongField::AlternativeTitle => &mut self.draft.alternative_title,
            SongField::Lyrics(language) => self.draft.lyrics_mut(language),
        }
    }

    pub(crate) fn value(&self, field: SongField) -> &str {
        match field {
            SongField::Title => &self.draft.title,
            SongField::AlternativeTitle => &self.draft.alternative_title,
            SongField::Lyrics(language) => self.draft.lyrics(language),
        }
    }

    /// Insert a character into the active field.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        let field = self.active;
        self.value_mut(field).push(ch);
        true
    }

    /// Enter inserts a line break in lyrics and moves on from single-line
    /// fields.
    pub(crate) fn enter(&mut self) {
        if self.active.is_multiline() {
            let field = self.active;
            self.value_mut(field).push('\n');
        } else {
            self.next_field();
        }
    }

    pub(crate) fn backspace(&mut self) {
        let field = self.active;
        self.value_mut(field).pop();
    }

    /// Validate and hand back a draft ready for the store.
    pub(crate) fn parse_inputs(&self) -> Result<SongDraft> {
        self.draft.validate()?;
        Ok(self.draft.clone())
    }

    /// Render every field and report where the cursor belongs, relative to the
    /// top-left of the form body.
    pub(crate) fn render_lines(&self) -> (Vec<Line<'static>>, (u16, u16)) {
        let mut lines = Vec::new();
        let mut cursor = (0u16, 0u16);

        for field in [SongField::Title, SongField::AlternativeTitle] {
            let is_active = self.active == field;
            let value = self.value(field);
            let placeholder = if field == SongField::Title {
                "<required>"
            } else {
                "<optional>"
            };
            if is_active {
                cursor = (
                    (field.prefix().chars().count() + value.chars().count()) as u16,
                    lines.len() as u16,
                );
            }
            lines.push(Line::from(vec![
                Span::raw(field.prefix()),
                field_span(value, placeholder, is_active),
            ]));
        }

        for language in Language::ALL {
            let field = SongField::Lyrics(language);
            let is_active = self.active == field;
            let value = self.value(field);

            lines.push(Line::from(""));
            let header_style = if is_active {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            };
            lines.push(Line::from(Span::styled(
                format!("{} ({} sections)", language.label(), section_count(value)),
                header_style,
            )));

            if value.is_empty() {
                if is_active {
                    cursor = (LYRIC_INDENT.len() as u16, lines.len() as u16);
                }
                lines.push(Line::from(vec![
                    Span::raw(LYRIC_INDENT),
                    field_span("", "<separate sections with a blank line>", is_active),
                ]));
                continue;
            }

            let all: Vec<&str> = value.split('\n').collect();
            let shown: &[&str] = if is_active {
                &all[all.len().saturating_sub(ACTIVE_LYRIC_LINES)..]
            } else {
                &all[..1]
            };
            for (idx, text) in shown.iter().enumerate() {
                if is_active && idx + 1 == shown.len() {
                    cursor = (
                        (LYRIC_INDENT.len() + text.chars().count()) as u16,
                        lines.len() as u16,
                    );
                }
                lines.push(Line::from(vec![
                    Span::raw(LYRIC_INDENT),
                    field_span(text, "", is_active),
                ]));
            }
            if !is_active && all.len() > 1 {
                lines.push(Line::from(Span::styled(
                    format!("{LYRIC_INDENT}… {} more lines", all.len() - 1),
                    Style::default().fg(Color::DarkGray),
                )));
            }
        }

        (lines, cursor)
    }
}

fn field_span(value: &str, placeholder: &str, is_active: bool) -> Span<'static> {
    let display = if value.is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    };

    let style = if is_active {
        Style::default().fg(Color::Yellow)
    } else if value.is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    Span::styled(display, style)
}
