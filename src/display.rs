//! What the display surface shows, as a pure function of the shared state and
//! the selected song's sections.

use crate::lyrics::{capitalize_words, SongSections};
use crate::models::{Alignment, BroadcastState, Language};

/// One language's text as it should appear on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LyricBlock {
    pub language: Language,
    pub text: String,
    pub font_size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayState {
    /// Broadcast is off; show the default placeholder.
    Idle,
    /// Broadcast is on but nothing visible exists at the current section.
    NoContent,
    Active {
        alignment: Alignment,
        blocks: Vec<LyricBlock>,
    },
}

impl DisplayState {
    pub fn resolve(state: &BroadcastState, sections: Option<&SongSections>) -> Self {
        if !state.is_live {
            return DisplayState::Idle;
        }
        let Some(sections) = sections else {
            return DisplayState::NoContent;
        };

        let blocks: Vec<LyricBlock> = Language::ALL
            .iter()
            .copied()
            .filter(|language| state.is_visible(*language))
            .filter_map(|language| {
                sections
                    .section(language, state.current_index)
                    .map(|text| LyricBlock {
                        language,
                        text: capitalize_words(Some(text)),
                        font_size: state.font_size(language),
                    })
            })
            .collect();

        if blocks.is_empty() {
            DisplayState::NoContent
        } else {
            DisplayState::Active {
                alignment: state.alignment,
                blocks,
            }
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, DisplayState::Active { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sections() -> SongSections {
        SongSections {
            tamil: vec!["tamil one".into()],
            hindi: vec![],
            english: vec!["english one".into(), "english two".into()],
        }
    }

    fn live() -> BroadcastState {
        BroadcastState {
            is_live: true,
            ..BroadcastState::default()
        }
    }

    #[test]
    fn not_live_is_idle_regardless_of_content() {
        let state = BroadcastState::default();
        assert_eq!(DisplayState::resolve(&state, Some(&sections())), DisplayState::Idle);
        assert_eq!(DisplayState::resolve(&state, None), DisplayState::Idle);
    }

    #[test]
    fn live_without_song_has_no_content() {
        assert_eq!(DisplayState::resolve(&live(), None), DisplayState::NoContent);
    }

    #[test]
    fn live_with_empty_visible_sections_has_no_content() {
        let state = BroadcastState {
            visible_languages: vec![Language::Hindi],
            ..live()
        };
        assert_eq!(
            DisplayState::resolve(&state, Some(&sections())),
            DisplayState::NoContent
        );

        let past_end = BroadcastState {
            current_index: 5,
            ..live()
        };
        assert_eq!(
            DisplayState::resolve(&past_end, Some(&sections())),
            DisplayState::NoContent
        );
    }

    #[test]
    fn only_languages_with_content_render() {
        let state = BroadcastState {
            current_index: 1,
            english_font_size: 48,
            alignment: Alignment::SideBySide,
            ..live()
        };
        match DisplayState::resolve(&state, Some(&sections())) {
            DisplayState::Active { alignment, blocks } => {
                assert_eq!(alignment, Alignment::SideBySide);
                assert_eq!(
                    blocks,
                    vec![LyricBlock {
                        language: Language::English,
                        text: "English Two".into(),
                        font_size: 48,
                    }]
                );
            }
            other => panic!("expected active display, got {other:?}"),
        }
    }

    #[test]
    fn hidden_languages_are_skipped() {
        let state = BroadcastState {
            visible_languages: vec![Language::English],
            ..live()
        };
        match DisplayState::resolve(&state, Some(&sections())) {
            DisplayState::Active { blocks, .. } => {
                let languages: Vec<_> = blocks.iter().map(|block| block.language).collect();
                assert_eq!(languages, vec![Language::English]);
            }
            other => panic!("expected active display, got {other:?}"),
        }
    }
}
