use std::mem;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use rusqlite::Connection;
use serde_json::{json, Value};

use crate::db::{
    create_song, get_song, watch_songs, watch_value, write_value, Subscription, LIVE_KEY,
    PREVIEW_KEY,
};
use crate::error::{SyncError, ValidationError};
use crate::lyrics::capitalize_words;
use crate::models::{Language, Song};
use crate::settings::{DisplaySettings, LocalSettings, SettingsStore};
use crate::sync::BroadcastSync;

use super::forms::SongForm;
use super::helpers::{centered_rect, section_buttons, surface_error, Palette};
use super::screens::{PreviewedSong, SongListScreen};
use super::terminal::Surface;

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Rows used by the broadcast control bar.
const CONTROL_BAR_HEIGHT: u16 = 4;
/// Generic message for store failures; details go to the log.
const STORE_FAILURE: &str = "Failed to update live settings";

/// Fine-grained modes layered over the controller screen.
enum Mode {
    Normal,
    CreatingSong(SongForm),
    Searching(SearchState),
}

/// State for an active inline search. `previous` restores the filter when
/// the search is cancelled.
struct SearchState {
    query: String,
    previous: String,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self, palette: &Palette) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(palette.error),
        }
    }
}

/// Operator surface: song list, preview and broadcast controls. Owns its
/// three subscriptions; dropping the app unsubscribes all of them.
pub struct ControllerApp {
    conn: Connection,
    songs_feed: Subscription<Vec<Song>>,
    live_feed: Subscription<Option<Value>>,
    preview_feed: Subscription<Option<Value>>,
    list: SongListScreen,
    preview: Option<PreviewedSong>,
    sync: BroadcastSync,
    focus_language: Language,
    settings_store: SettingsStore,
    settings: LocalSettings,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl ControllerApp {
    pub fn new(
        conn: Connection,
        db_path: &Path,
        poll_interval: Duration,
        settings_store: SettingsStore,
    ) -> Result<Self> {
        let settings = settings_store.load();
        let songs_feed = watch_songs(db_path, poll_interval)?;
        let live_feed = watch_value(db_path, LIVE_KEY, poll_interval)?;
        let preview_feed = watch_value(db_path, PREVIEW_KEY, poll_interval)?;

        Ok(Self {
            conn,
            songs_feed,
            live_feed,
            preview_feed,
            list: SongListScreen::new(Vec::new()),
            preview: None,
            sync: BroadcastSync::seeded(&settings.display),
            focus_language: Language::Tamil,
            settings_store,
            settings,
            mode: Mode::Normal,
            status: None,
        })
    }

    fn palette(&self) -> Palette {
        Palette::new(self.settings.dark_theme)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                *exit = true;
            }
            KeyCode::Up => self.list.move_selection(-1),
            KeyCode::Down => self.list.move_selection(1),
            KeyCode::PageUp => self.list.move_selection(-5),
            KeyCode::PageDown => self.list.move_selection(5),
            KeyCode::Home => self.list.select_first(),
            KeyCode::End => self.list.select_last(),
            KeyCode::Enter => self.select_current_song(),
            KeyCode::Char(' ') => {
                if let Some(is_live) = self.broadcast(|sync, conn| sync.toggle_live(conn)) {
                    let text = if is_live { "Broadcast is live." } else { "Broadcast stopped." };
                    self.set_status(text, StatusKind::Info);
                }
            }
            KeyCode::Char('a') | KeyCode::Char('A') => {
                if let Some(alignment) = self.broadcast(|sync, conn| sync.cycle_alignment(conn)) {
                    self.save_settings();
                    self.set_status(format!("Alignment: {}.", alignment.label()), StatusKind::Info);
                }
            }
            KeyCode::Tab => {
                self.focus_language = self.focus_language.next();
            }
            KeyCode::BackTab => {
                self.focus_language = self.focus_language.next().next();
            }
            KeyCode::Char('v') | KeyCode::Char('V') => {
                let language = self.focus_language;
                if let Some(visible) =
                    self.broadcast(|sync, conn| sync.toggle_language(conn, language))
                {
                    self.save_settings();
                    let state = if visible { "shown" } else { "hidden" };
                    self.set_status(format!("{} {state}.", language.label()), StatusKind::Info);
                }
            }
            KeyCode::Char('+') | KeyCode::Char('=') => self.adjust_font(1),
            KeyCode::Char('-') | KeyCode::Char('_') => self.adjust_font(-1),
            KeyCode::Left => {
                self.broadcast(|sync, conn| sync.previous_section(conn));
            }
            KeyCode::Right => {
                let count = self.section_count();
                self.broadcast(|sync, conn| sync.next_section(conn, count));
            }
            KeyCode::Char(ch @ '1'..='9') => {
                let index = ch as usize - '1' as usize;
                if index < self.section_count() {
                    self.broadcast(|sync, conn| sync.set_current_index(conn, index));
                } else {
                    self.set_status(format!("No section {}.", index + 1), StatusKind::Error);
                }
            }
            KeyCode::Char('n') | KeyCode::Char('N') => {
                self.clear_status();
                return Ok(Mode::CreatingSong(SongForm::default()));
            }
            KeyCode::Char('/') | KeyCode::Char('f') => {
                let current = self.list.filter.query().to_string();
                return Ok(Mode::Searching(SearchState {
                    query: current.clone(),
                    previous: current,
                }));
            }
            KeyCode::F(n @ 1..=3) => {
                let language = Language::ALL[(n - 1) as usize];
                let active = self.list.toggle_language(language);
                let text = if active {
                    format!("Showing songs with {} lyrics.", language.label())
                } else {
                    format!("{} filter removed.", language.label())
                };
                self.set_status(text, StatusKind::Info);
            }
            KeyCode::Char('d') | KeyCode::Char('D') => {
                self.settings.dark_theme = !self.settings.dark_theme;
                self.save_settings();
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_search(&mut self, code: KeyCode, mut state: SearchState) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.list.set_query(&state.previous);
                return Ok(Mode::Normal);
            }
            KeyCode::Enter => return Ok(Mode::Normal),
            KeyCode::Backspace => {
                state.query.pop();
            }
            KeyCode::Up => self.list.move_selection(-1),
            KeyCode::Down => self.list.move_selection(1),
            KeyCode::Char(ch) if !ch.is_control() => state.query.push(ch),
            _ => return Ok(Mode::Searching(state)),
        }
        self.list.set_query(&state.query);
        Ok(Mode::Searching(state))
    }

    fn handle_create_song(&mut self, code: KeyCode, mut form: SongForm) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status("Song creation cancelled.", StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Tab => form.next_field(),
            KeyCode::BackTab => form.previous_field(),
            KeyCode::Enter => form.enter(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Ok(Mode::CreatingSong(form))
    }

    /// Validate and persist the form. Returns whether the form should close.
    fn save_new_song(&mut self, form: &mut SongForm) -> bool {
        let draft = match form.parse_inputs() {
            Ok(draft) => draft,
            Err(err) => {
                let message = surface_error(&err);
                form.error = Some(message.clone());
                self.set_status(message, StatusKind::Error);
                return false;
            }
        };

        match create_song(&self.conn, &draft) {
            Ok(song) => {
                self.set_status(format!("Added {}.", song.title), StatusKind::Info);
                true
            }
            Err(err) => {
                tracing::error!(error = ?err, "failed to add lyrics");
                let message = if err.downcast_ref::<ValidationError>().is_some() {
                    surface_error(&err)
                } else {
                    "Failed to add lyrics".to_string()
                };
                form.error = Some(message.clone());
                self.set_status(message, StatusKind::Error);
                false
            }
        }
    }

    /// Run a broadcast action, turning failures into footer messages.
    fn broadcast<T>(
        &mut self,
        action: impl FnOnce(&mut BroadcastSync, &Connection) -> Result<T>,
    ) -> Option<T> {
        match action(&mut self.sync, &self.conn) {
            Ok(value) => Some(value),
            Err(err) => {
                if let Some(refused) = err.downcast_ref::<SyncError>() {
                    let text = refused.to_string();
                    self.set_status(text, StatusKind::Error);
                } else {
                    tracing::error!(error = ?err, "broadcast update failed");
                    self.set_status(STORE_FAILURE, StatusKind::Error);
                }
                None
            }
        }
    }

    fn adjust_font(&mut self, steps: i32) {
        let language = self.focus_language;
        if let Some(size) = self.broadcast(|sync, conn| sync.adjust_font_size(conn, language, steps))
        {
            self.save_settings();
            self.set_status(format!("{} font size {size}px.", language.label()), StatusKind::Info);
        }
    }

    /// Publish the highlighted song as the preview and rewind to its first
    /// section.
    fn select_current_song(&mut self) {
        let Some(song) = self.list.current_song().cloned() else {
            self.set_status("No song selected.", StatusKind::Error);
            return;
        };

        if let Err(err) = write_value(&self.conn, PREVIEW_KEY, &json!(song.id)) {
            tracing::error!(error = ?err, id = %song.id, "failed to publish preview");
            self.set_status("Failed to select song", StatusKind::Error);
            return;
        }
        self.broadcast(|sync, conn| sync.set_current_index(conn, 0));
        self.set_status(format!("Previewing {}.", song.title), StatusKind::Info);
        self.preview = Some(PreviewedSong::new(song));
    }

    /// React to a `preview` snapshot: load the song if it changed, clear the
    /// selection when the value is gone.
    fn apply_preview(&mut self, snapshot: Option<Value>) {
        let Some(id) = snapshot.as_ref().and_then(Value::as_str).map(str::to_string) else {
            self.preview = None;
            return;
        };
        if self.preview.as_ref().map(|p| p.song.id.as_str()) == Some(id.as_str()) {
            return;
        }

        match get_song(&self.conn, &id) {
            Ok(Some(song)) => {
                self.list.select_id(&song.id);
                self.preview = Some(PreviewedSong::new(song));
            }
            Ok(None) => tracing::warn!(id = %id, "preview points at a missing song"),
            Err(err) => {
                tracing::error!(error = ?err, id = %id, "failed to load previewed song");
                self.set_status("Failed to load the selected song", StatusKind::Error);
            }
        }
    }

    fn section_count(&self) -> usize {
        self.preview
            .as_ref()
            .map(|preview| preview.sections.count())
            .unwrap_or(0)
    }

    /// Cache the current display settings and theme for the next session.
    fn save_settings(&mut self) {
        self.settings.display = DisplaySettings::from_state(self.sync.state());
        if let Err(err) = self.settings_store.save(&self.settings) {
            tracing::warn!(error = ?err, "failed to save local settings");
            self.set_status("Failed to save settings", StatusKind::Error);
        }
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    fn draw_control_bar(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let state = self.sync.state();
        let block = Block::default().borders(Borders::ALL).title("Broadcast");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let live_span = if state.is_live {
            Span::styled(
                "● LIVE",
                Style::default()
                    .fg(palette.live)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled("○ READY", Style::default().fg(palette.muted))
        };
        let count = self.section_count();
        let section = if count == 0 {
            "-".to_string()
        } else {
            format!("{}/{count}", state.current_index.saturating_add(1))
        };
        let summary = Line::from(vec![
            live_span,
            Span::raw(format!(
                "   Alignment: {}   Section: {section}",
                state.alignment.label()
            )),
        ]);

        let mut languages = Vec::new();
        for language in Language::ALL {
            let checkbox = if state.is_visible(language) { "[x]" } else { "[ ]" };
            let mut style = Style::default().fg(palette.language(language));
            if language == self.focus_language {
                style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
            }
            languages.push(Span::styled(
                format!(
                    "{checkbox} {} {}px",
                    language.native_label(),
                    state.font_size(language)
                ),
                style,
            ));
            languages.push(Span::raw("   "));
        }

        let paragraph = Paragraph::new(vec![summary, Line::from(languages)]);
        frame.render_widget(paragraph, inner);
    }

    fn draw_song_list(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(self.list.title());

        if self.list.filtered_songs.is_empty() {
            let message = if self.list.songs.is_empty() {
                "No songs yet. Press 'n' to add one."
            } else {
                "No songs match the current filter."
            };
            let paragraph = Paragraph::new(message)
                .block(block)
                .style(Style::default().fg(palette.muted))
                .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, area);
            return;
        }

        let previewed = self.preview.as_ref().map(|p| p.song.id.as_str());
        let items: Vec<ListItem> = self
            .list
            .filtered_songs
            .iter()
            .map(|song| {
                let marker = if Some(song.id.as_str()) == previewed { "● " } else { "  " };
                let mut lines = vec![Line::from(vec![
                    Span::styled(marker, Style::default().fg(palette.live)),
                    Span::styled(
                        song.title.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                ])];
                if let Some(alt) = song.alternative_title.as_deref().filter(|alt| !alt.is_empty()) {
                    lines.push(Line::from(Span::styled(
                        format!("  {alt}"),
                        Style::default().fg(palette.muted),
                    )));
                }
                ListItem::new(lines)
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().fg(palette.highlight))
            .highlight_symbol("▶ ");

        let mut list_state = ListState::default();
        list_state.select(Some(self.list.selected));
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn draw_preview(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let block = Block::default().borders(Borders::ALL).title("Preview");
        let Some(preview) = &self.preview else {
            let paragraph = Paragraph::new("Select a song to preview")
                .block(block)
                .style(Style::default().fg(palette.muted))
                .alignment(ratatui::layout::Alignment::Center);
            frame.render_widget(paragraph, area);
            return;
        };

        let state = self.sync.state();
        let mut lines = vec![Line::from(Span::styled(
            preview.song.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ))];
        if let Some(alt) = preview
            .song
            .alternative_title
            .as_deref()
            .filter(|alt| !alt.is_empty())
        {
            lines.push(Line::from(Span::styled(
                alt.to_string(),
                Style::default().fg(palette.muted),
            )));
        }
        lines.push(section_buttons(
            preview.sections.count(),
            state.current_index,
            palette,
        ));

        for language in Language::ALL {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                language.label(),
                Style::default()
                    .fg(palette.language(language))
                    .add_modifier(Modifier::BOLD),
            )));
            match preview.sections.section(language, state.current_index) {
                Some(text) => {
                    for line in capitalize_words(Some(text)).lines() {
                        lines.push(Line::from(line.to_string()));
                    }
                }
                None => lines.push(Line::from(Span::styled(
                    format!("No {} lyrics for this section", language.label()),
                    Style::default()
                        .fg(palette.muted)
                        .add_modifier(Modifier::ITALIC),
                ))),
            }
        }

        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(
                status.text.clone(),
                status.kind.style(palette),
            )])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions(palette);

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self, palette: &Palette) -> Line<'static> {
        let key_style = palette.key();
        let pairs: &[(&str, &str)] = match &self.mode {
            Mode::CreatingSong(_) => &[
                ("[Ctrl+S]", " Save   "),
                ("[Tab]", " Next field   "),
                ("[Enter]", " New line   "),
                ("[Esc]", " Cancel"),
            ],
            Mode::Searching(_) => &[
                ("[Enter]", " Keep filter   "),
                ("[↑↓]", " Navigate   "),
                ("[Esc]", " Cancel"),
            ],
            Mode::Normal => &[
                ("[Enter]", " Preview   "),
                ("[Space]", " Live   "),
                ("[←→/1-9]", " Section   "),
                ("[a]", " Align   "),
                ("[Tab/v/+-]", " Language   "),
                ("[/ F1-F3]", " Filter   "),
                ("[n]", " New   "),
                ("[d]", " Theme   "),
                ("[q]", " Quit"),
            ],
        };

        let spans: Vec<Span<'static>> = pairs
            .iter()
            .flat_map(|(key, label)| {
                [
                    Span::styled(key.to_string(), key_style),
                    Span::raw(label.to_string()),
                ]
            })
            .collect();
        Line::from(spans)
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect, state: &SearchState) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title("Search");
        let paragraph = Paragraph::new(Span::raw(format!("Search: {}", state.query)))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = inner.x + "Search: ".len() as u16 + state.query.chars().count() as u16;
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn draw_song_form(&self, frame: &mut Frame, area: Rect, form: &SongForm, palette: &Palette) {
        let popup_area = centered_rect(80, 80, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Add New Lyrics")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let (mut lines, (cursor_col, cursor_row)) = form.render_lines();
        lines.push(Line::from(""));
        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(palette.error),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Ctrl+S to save • Tab to switch • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines);
        frame.render_widget(paragraph, inner);

        if cursor_row < inner.height {
            let x = (inner.x + cursor_col).min(inner.x + inner.width.saturating_sub(1));
            frame.set_cursor_position((x, inner.y + cursor_row));
        }
    }
}

impl Surface for ControllerApp {
    fn refresh(&mut self) -> Result<()> {
        if let Some(songs) = self.songs_feed.latest() {
            self.list.set_songs(songs);
        }
        if let Some(live) = self.live_feed.latest() {
            self.sync.apply_remote(live.as_ref());
        }
        if let Some(preview) = self.preview_feed.latest() {
            self.apply_preview(preview);
        }
        Ok(())
    }

    fn draw(&self, frame: &mut Frame) {
        let palette = self.palette();
        let area = frame.area();
        frame.render_widget(Block::default().style(palette.base()), area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(CONTROL_BAR_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        self.draw_control_bar(frame, chunks[0], &palette);

        let main = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
            .split(chunks[1]);
        self.draw_song_list(frame, main[0], &palette);
        self.draw_preview(frame, main[1], &palette);

        self.draw_footer(frame, chunks[2], &palette);

        match &self.mode {
            Mode::CreatingSong(form) => self.draw_song_form(frame, area, form, &palette),
            Mode::Searching(state) => self.draw_search_bar(frame, area, state),
            Mode::Normal => {}
        }
    }

    fn handle_ctrl(&mut self, code: KeyCode) -> Result<bool> {
        if code != KeyCode::Char('s') {
            return Ok(false);
        }
        let mode = mem::replace(&mut self.mode, Mode::Normal);
        self.mode = match mode {
            Mode::CreatingSong(mut form) => {
                if self.save_new_song(&mut form) {
                    Mode::Normal
                } else {
                    Mode::CreatingSong(form)
                }
            }
            other => other,
        };
        Ok(true)
    }

    fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mut mode = mem::replace(&mut self.mode, Mode::Normal);

        mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::CreatingSong(form) => self.handle_create_song(code, form)?,
            Mode::Searching(state) => self.handle_search(code, state)?,
        };

        self.mode = mode;
        Ok(exit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{ensure_schema, fetch_songs, read_value};
    use crate::models::BroadcastState;
    use tempfile::TempDir;

    const POLL: Duration = Duration::from_millis(20);

    fn controller() -> (TempDir, ControllerApp) {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("lyrics.sqlite");
        let conn = ensure_schema(&db_path).unwrap();
        let store = SettingsStore::in_dir(dir.path());
        let app = ControllerApp::new(conn, &db_path, POLL, store).unwrap();
        (dir, app)
    }

    fn type_text(app: &mut ControllerApp, text: &str) {
        for ch in text.chars() {
            app.handle_key(KeyCode::Char(ch)).unwrap();
        }
    }

    #[test]
    fn empty_title_creates_nothing() {
        let (_dir, mut app) = controller();
        app.handle_key(KeyCode::Char('n')).unwrap();
        assert!(app.handle_ctrl(KeyCode::Char('s')).unwrap());

        assert!(matches!(&app.mode, Mode::CreatingSong(form) if form.error.as_deref() == Some("Please enter a title")));
        assert!(fetch_songs(&app.conn).unwrap().is_empty());
    }

    #[test]
    fn saving_creates_one_song_and_resets_the_form() {
        let (_dir, mut app) = controller();
        app.handle_key(KeyCode::Char('n')).unwrap();
        type_text(&mut app, "Amazing Grace");
        app.handle_key(KeyCode::Tab).unwrap();
        app.handle_key(KeyCode::Tab).unwrap();
        type_text(&mut app, "verse");
        app.handle_ctrl(KeyCode::Char('s')).unwrap();

        assert!(matches!(app.mode, Mode::Normal));
        let songs = fetch_songs(&app.conn).unwrap();
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].title, "Amazing Grace");
        assert_eq!(songs[0].tamil.as_deref(), Some("verse"));
        assert!(songs[0].created_at.is_some());

        app.handle_key(KeyCode::Char('n')).unwrap();
        match &app.mode {
            Mode::CreatingSong(form) => assert!(form.draft.title.is_empty()),
            _ => panic!("expected the song form"),
        }
    }

    #[test]
    fn store_failure_keeps_the_draft() {
        let (_dir, mut app) = controller();
        app.conn.execute("DROP TABLE documents", []).unwrap();
        app.handle_key(KeyCode::Char('n')).unwrap();
        type_text(&mut app, "Holy Holy");
        app.handle_ctrl(KeyCode::Char('s')).unwrap();

        match &app.mode {
            Mode::CreatingSong(form) => {
                assert_eq!(form.draft.title, "Holy Holy");
                assert_eq!(form.error.as_deref(), Some("Failed to add lyrics"));
            }
            _ => panic!("form should stay open"),
        }
    }

    #[test]
    fn space_publishes_live_flag() {
        let (_dir, mut app) = controller();
        app.handle_key(KeyCode::Char(' ')).unwrap();
        assert_eq!(
            read_value(&app.conn, "live/isLive").unwrap(),
            Some(json!(true))
        );
        assert!(app.sync.state().is_live);
    }

    #[test]
    fn selecting_a_song_publishes_preview_and_rewinds() {
        let (_dir, mut app) = controller();
        app.sync
            .update(
                &app.conn,
                crate::models::BroadcastUpdate {
                    current_index: Some(3),
                    ..Default::default()
                },
            )
            .unwrap();
        let song = create_song(
            &app.conn,
            &crate::models::SongDraft {
                title: "Blessed Be".into(),
                english: "a\n\nb".into(),
                ..Default::default()
            },
        )
        .unwrap();
        app.list.set_songs(vec![song.clone()]);

        app.handle_key(KeyCode::Enter).unwrap();

        assert_eq!(
            read_value(&app.conn, PREVIEW_KEY).unwrap(),
            Some(json!(song.id))
        );
        let live = read_value(&app.conn, LIVE_KEY).unwrap().unwrap();
        assert_eq!(BroadcastState::from_value(&live).current_index, 0);
        assert_eq!(app.section_count(), 2);
    }

    #[test]
    fn hiding_every_language_is_refused() {
        let (_dir, mut app) = controller();
        app.handle_key(KeyCode::Char('v')).unwrap();
        app.handle_key(KeyCode::Tab).unwrap();
        app.handle_key(KeyCode::Char('v')).unwrap();
        app.handle_key(KeyCode::Tab).unwrap();
        app.handle_key(KeyCode::Char('v')).unwrap();

        assert_eq!(app.sync.state().visible_languages, vec![Language::English]);
        assert_eq!(
            app.status.as_ref().map(|s| s.text.as_str()),
            Some("At least one language must stay visible")
        );
        let cached = app.settings_store.load();
        assert_eq!(cached.display.visible_languages, vec![Language::English]);
    }

    #[test]
    fn first_go_live_publishes_cached_settings() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("lyrics.sqlite");
        let conn = ensure_schema(&db_path).unwrap();
        let store = SettingsStore::in_dir(dir.path());
        store
            .save(&LocalSettings {
                dark_theme: false,
                display: DisplaySettings {
                    alignment: crate::models::Alignment::Diagonal,
                    hindi_font_size: 44,
                    ..DisplaySettings::default()
                },
            })
            .unwrap();

        let mut app = ControllerApp::new(conn, &db_path, POLL, store).unwrap();
        app.handle_key(KeyCode::Char(' ')).unwrap();

        let live = read_value(&app.conn, LIVE_KEY).unwrap().unwrap();
        let published = BroadcastState::from_value(&live);
        assert!(published.is_live);
        assert_eq!(published.alignment, crate::models::Alignment::Diagonal);
        assert_eq!(published.hindi_font_size, 44);
    }

    #[test]
    fn huge_remote_index_still_draws() {
        use ratatui::backend::TestBackend;
        use ratatui::Terminal;

        let (_dir, mut app) = controller();
        app.sync
            .apply_remote(Some(&json!({ "isLive": true, "currentIndex": u64::MAX })));
        app.preview = Some(PreviewedSong::new(Song {
            id: "s1".into(),
            title: "Way Maker".into(),
            alternative_title: None,
            tamil: None,
            hindi: None,
            english: Some("one\n\ntwo".into()),
            created_at: None,
        }));

        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
    }
}
