//! Local mirror of the shared `live` record.
//!
//! Remote snapshots replace the mirror wholesale. Local control actions
//! either merge into a full copy of the mirror and overwrite the whole record,
//! or, for the live flag and the section index, write just that one field.
//! Until a snapshot has been seen or a full write made, those two actions
//! publish the whole mirror instead, so a state seeded from local settings
//! reaches the shared record intact.
//! There is no versioning: the last write any subscriber observes wins.

use anyhow::Result;
use rusqlite::Connection;
use serde_json::{json, Value};

use crate::db::{write_value, LIVE_KEY};
use crate::error::SyncError;
use crate::models::{
    clamp_font_size, Alignment, BroadcastState, BroadcastUpdate, Language, FONT_SIZE_STEP,
};
use crate::settings::DisplaySettings;

#[derive(Debug, Clone, Default)]
pub struct BroadcastSync {
    state: BroadcastState,
    /// Whether the shared record is known to hold a full copy of `state`.
    /// Until it does, single-field actions publish the whole mirror so a
    /// seeded state is never reduced to the one field that changed.
    published: bool,
}

impl BroadcastSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from cached local settings until the first snapshot arrives.
    pub fn seeded(settings: &DisplaySettings) -> Self {
        Self {
            state: settings.apply_to(&BroadcastState::default()),
            published: false,
        }
    }

    pub fn state(&self) -> &BroadcastState {
        &self.state
    }

    /// Replace local state with a remote snapshot. An absent record leaves
    /// the mirror untouched.
    pub fn apply_remote(&mut self, snapshot: Option<&Value>) {
        match snapshot {
            Some(value) => {
                self.state = BroadcastState::from_value(value);
                self.published = true;
            }
            None => tracing::debug!("live record absent, keeping local state"),
        }
    }

    /// Merge `update` into the mirror and overwrite the whole remote record.
    pub fn update(&mut self, conn: &Connection, update: BroadcastUpdate) -> Result<&BroadcastState> {
        let merged = update.merge_into(&self.state);
        write_value(conn, LIVE_KEY, &merged.to_value())?;
        self.state = merged;
        self.published = true;
        Ok(&self.state)
    }

    /// Flip the live flag with a single-field write, or a full write while
    /// the shared record has not been seen yet.
    pub fn toggle_live(&mut self, conn: &Connection) -> Result<bool> {
        let is_live = !self.state.is_live;
        if self.published {
            write_value(conn, &field_path("isLive"), &json!(is_live))?;
            self.state.is_live = is_live;
        } else {
            self.update(conn, BroadcastUpdate::live(is_live))?;
        }
        tracing::info!(is_live, "toggled live");
        Ok(is_live)
    }

    /// Move to section `index` with a single-field write. Falls back to a
    /// full write like [`Self::toggle_live`].
    pub fn set_current_index(&mut self, conn: &Connection, index: usize) -> Result<usize> {
        if self.published {
            write_value(conn, &field_path("currentIndex"), &json!(index))?;
            self.state.current_index = index;
        } else {
            self.update(
                conn,
                BroadcastUpdate {
                    current_index: Some(index),
                    ..BroadcastUpdate::default()
                },
            )?;
        }
        Ok(index)
    }

    /// Advance one section, stopping at the last of `section_count`.
    pub fn next_section(&mut self, conn: &Connection, section_count: usize) -> Result<usize> {
        let last = section_count.saturating_sub(1);
        let index = self.state.current_index.saturating_add(1).min(last);
        self.set_current_index(conn, index)
    }

    pub fn previous_section(&mut self, conn: &Connection) -> Result<usize> {
        let index = self.state.current_index.saturating_sub(1);
        self.set_current_index(conn, index)
    }

    pub fn set_alignment(&mut self, conn: &Connection, alignment: Alignment) -> Result<Alignment> {
        self.update(conn, BroadcastUpdate::alignment(alignment))?;
        Ok(alignment)
    }

    pub fn cycle_alignment(&mut self, conn: &Connection) -> Result<Alignment> {
        let next = self.state.alignment.next();
        self.set_alignment(conn, next)
    }

    /// Show or hide `language`. Hiding the last visible language is refused
    /// and nothing is written. Returns whether the language is now visible.
    pub fn toggle_language(&mut self, conn: &Connection, language: Language) -> Result<bool> {
        let mut languages = self.state.visible_languages.clone();
        let visible = if languages.contains(&language) {
            if languages.len() == 1 {
                return Err(SyncError::LastVisibleLanguage.into());
            }
            languages.retain(|candidate| *candidate != language);
            false
        } else {
            languages.push(language);
            true
        };
        self.update(conn, BroadcastUpdate::visible_languages(languages))?;
        Ok(visible)
    }

    /// Publish a new font size for `language`, clamped to the allowed range.
    pub fn set_font_size(&mut self, conn: &Connection, language: Language, size: i64) -> Result<u32> {
        let size = clamp_font_size(size);
        self.update(conn, BroadcastUpdate::font_size(language, size))?;
        Ok(size)
    }

    /// Step the font size up (`steps > 0`) or down.
    pub fn adjust_font_size(&mut self, conn: &Connection, language: Language, steps: i32) -> Result<u32> {
        let current = self.state.font_size(language) as i64;
        self.set_font_size(conn, language, current + (steps * FONT_SIZE_STEP) as i64)
    }
}

fn field_path(field: &str) -> String {
    format!("{LIVE_KEY}/{field}")
}
