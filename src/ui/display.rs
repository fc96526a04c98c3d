use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment as TextAlign, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Wrap};
use ratatui::Frame;
use rusqlite::Connection;
use serde_json::Value;

use crate::db::{get_song, watch_value, Subscription, LIVE_KEY, PREVIEW_KEY};
use crate::display::{DisplayState, LyricBlock};
use crate::lyrics::SongSections;
use crate::models::Alignment;
use crate::sync::BroadcastSync;

use super::helpers::{centered_band, Palette};
use super::terminal::Surface;

/// Font sizes at or above this render bold.
const BOLD_FONT_SIZE: u32 = 32;
/// Horizontal step between blocks in the diagonal layout, in percent.
const DIAGONAL_STEP: u16 = 15;

/// Read-only audience surface. Follows `live` and `preview` and renders
/// whatever they describe.
pub struct DisplayView {
    conn: Connection,
    live_feed: Subscription<Option<Value>>,
    preview_feed: Subscription<Option<Value>>,
    sync: BroadcastSync,
    song: Option<(String, SongSections)>,
    /// Whether the last refresh left lyrics on screen.
    showing_lyrics: bool,
    placeholder: String,
    palette: Palette,
}

impl DisplayView {
    pub fn new(
        conn: Connection,
        db_path: &Path,
        poll_interval: Duration,
        placeholder: String,
        dark_theme: bool,
    ) -> Result<Self> {
        Ok(Self {
            live_feed: watch_value(db_path, LIVE_KEY, poll_interval)?,
            preview_feed: watch_value(db_path, PREVIEW_KEY, poll_interval)?,
            conn,
            sync: BroadcastSync::new(),
            song: None,
            showing_lyrics: false,
            placeholder,
            palette: Palette::new(dark_theme),
        })
    }

    fn state(&self) -> DisplayState {
        DisplayState::resolve(
            self.sync.state(),
            self.song.as_ref().map(|(_, sections)| sections),
        )
    }

    fn apply_preview(&mut self, snapshot: Option<Value>) {
        let Some(id) = snapshot.as_ref().and_then(Value::as_str) else {
            self.song = None;
            return;
        };
        if self.song.as_ref().map(|(current, _)| current.as_str()) == Some(id) {
            return;
        }

        match get_song(&self.conn, id) {
            Ok(Some(song)) => {
                tracing::info!(id, title = %song.title, "displaying song");
                self.song = Some((song.id.clone(), SongSections::from_song(&song)));
            }
            Ok(None) => {
                tracing::warn!(id, "preview points at a missing song");
                self.song = None;
            }
            Err(err) => tracing::error!(error = ?err, id, "failed to load song for display"),
        }
    }

    fn draw_placeholder(&self, frame: &mut Frame, area: Rect) {
        let band = centered_band(1, area);
        let paragraph = Paragraph::new(Span::styled(
            self.placeholder.clone(),
            Style::default()
                .fg(self.palette.accent)
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(TextAlign::Center);
        frame.render_widget(paragraph, band);
    }

    fn draw_no_content(&self, frame: &mut Frame, area: Rect) {
        let band = centered_band(2, area);
        let paragraph = Paragraph::new(vec![
            Line::from(Span::styled(
                "No lyrics to display",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Please select a song and go live",
                Style::default().fg(self.palette.muted),
            )),
        ])
        .alignment(TextAlign::Center);
        frame.render_widget(paragraph, band);
    }

    fn draw_blocks(&self, frame: &mut Frame, area: Rect, alignment: Alignment, blocks: &[LyricBlock]) {
        match alignment {
            Alignment::TopBottom => {
                let areas = weighted_split(Direction::Vertical, area, blocks);
                for (block, area) in blocks.iter().zip(areas.iter()) {
                    self.draw_block(frame, *area, block, TextAlign::Center);
                }
            }
            Alignment::SideBySide => {
                let areas = weighted_split(Direction::Horizontal, area, blocks);
                for (block, area) in blocks.iter().zip(areas.iter()) {
                    self.draw_block(frame, *area, block, TextAlign::Center);
                }
            }
            Alignment::Diagonal => {
                let rows = weighted_split(Direction::Vertical, area, blocks);
                for (index, (block, row)) in blocks.iter().zip(rows.iter()).enumerate() {
                    let offset = (index as u16 * DIAGONAL_STEP).min(100 - DIAGONAL_STEP * 2);
                    let columns = Layout::default()
                        .direction(Direction::Horizontal)
                        .constraints([
                            Constraint::Percentage(offset),
                            Constraint::Percentage(100 - offset - DIAGONAL_STEP),
                            Constraint::Min(0),
                        ])
                        .split(*row);
                    self.draw_block(frame, columns[1], block, TextAlign::Left);
                }
            }
        }
    }

    fn draw_block(&self, frame: &mut Frame, area: Rect, block: &LyricBlock, align: TextAlign) {
        let mut style = Style::default().fg(self.palette.language(block.language));
        if block.font_size >= BOLD_FONT_SIZE {
            style = style.add_modifier(Modifier::BOLD);
        }
        let lines: Vec<Line> = block
            .text
            .lines()
            .map(|line| Line::from(Span::styled(line.to_string(), style)))
            .collect();
        let height = (lines.len() as u16).min(area.height);
        let paragraph = Paragraph::new(lines)
            .alignment(align)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, centered_band(height, area));
    }
}

/// Split `area` so each block's share follows its font size.
fn weighted_split(direction: Direction, area: Rect, blocks: &[LyricBlock]) -> Vec<Rect> {
    Layout::default()
        .direction(direction)
        .constraints(
            blocks
                .iter()
                .map(|block| Constraint::Fill(fill_weight(block.font_size))),
        )
        .split(area)
        .to_vec()
}

/// Layout weight for a font size. Sizes beyond `u16` saturate.
fn fill_weight(font_size: u32) -> u16 {
    u16::try_from(font_size).unwrap_or(u16::MAX)
}

impl Surface for DisplayView {
    fn refresh(&mut self) -> Result<()> {
        if let Some(live) = self.live_feed.latest() {
            self.sync.apply_remote(live.as_ref());
        }
        if let Some(preview) = self.preview_feed.latest() {
            self.apply_preview(preview);
        }
        let showing_lyrics = self.state().is_active();
        if showing_lyrics != self.showing_lyrics {
            tracing::info!(showing_lyrics, "display content changed");
            self.showing_lyrics = showing_lyrics;
        }
        Ok(())
    }

    fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(self.palette.base()), area);

        match self.state() {
            DisplayState::Idle => self.draw_placeholder(frame, area),
            DisplayState::NoContent => self.draw_no_content(frame, area),
            DisplayState::Active { alignment, blocks } => {
                self.draw_blocks(frame, area, alignment, &blocks)
            }
        }
    }

    fn handle_ctrl(&mut self, _code: KeyCode) -> Result<bool> {
        Ok(false)
    }

    fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        Ok(matches!(code, KeyCode::Char('q') | KeyCode::Esc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_song, ensure_schema, write_value};
    use crate::models::SongDraft;
    use serde_json::json;

    const POLL: Duration = Duration::from_millis(20);

    #[test]
    fn follows_live_and_preview_records() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("lyrics.sqlite");
        let conn = ensure_schema(&db_path).unwrap();
        let song = create_song(
            &conn,
            &SongDraft {
                title: "Great Is Thy Faithfulness".into(),
                english: "great is thy faithfulness".into(),
                ..Default::default()
            },
        )
        .unwrap();

        let viewer = ensure_schema(&db_path).unwrap();
        let mut view =
            DisplayView::new(viewer, &db_path, POLL, "Shalom".into(), true).unwrap();
        view.refresh().unwrap();
        assert_eq!(view.state(), DisplayState::Idle);

        write_value(&conn, PREVIEW_KEY, &json!(song.id)).unwrap();
        write_value(&conn, "live/isLive", &json!(true)).unwrap();

        let mut state = view.state();
        for _ in 0..100 {
            view.refresh().unwrap();
            state = view.state();
            if state.is_active() {
                break;
            }
            std::thread::sleep(POLL);
        }
        assert!(view.showing_lyrics);
        match state {
            DisplayState::Active { blocks, .. } => {
                assert_eq!(blocks.len(), 1);
                assert_eq!(blocks[0].text, "Great Is Thy Faithfulness");
            }
            other => panic!("expected lyrics on screen, got {other:?}"),
        }
    }

    #[test]
    fn oversized_fonts_keep_their_weight() {
        assert_eq!(fill_weight(48), 48);
        assert_eq!(fill_weight(65_536), u16::MAX);
        assert_eq!(fill_weight(u32::MAX), u16::MAX);
    }

    #[test]
    fn quits_on_q_or_escape() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("lyrics.sqlite");
        let conn = ensure_schema(&db_path).unwrap();
        let mut view = DisplayView::new(conn, &db_path, POLL, "Shalom".into(), false).unwrap();
        assert!(!view.handle_key(KeyCode::Char('x')).unwrap());
        assert!(view.handle_key(KeyCode::Char('q')).unwrap());
        assert!(view.handle_key(KeyCode::Esc).unwrap());
    }
}
