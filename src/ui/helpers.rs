use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::models::Language;

/// Colors for one theme. Both surfaces read the same flag from the local
/// settings.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Palette {
    pub(crate) background: Color,
    pub(crate) text: Color,
    pub(crate) muted: Color,
    pub(crate) accent: Color,
    pub(crate) highlight: Color,
    pub(crate) live: Color,
    pub(crate) error: Color,
}

impl Palette {
    pub(crate) fn new(dark: bool) -> Self {
        if dark {
            Self {
                background: Color::Black,
                text: Color::White,
                muted: Color::DarkGray,
                accent: Color::Cyan,
                highlight: Color::Yellow,
                live: Color::LightRed,
                error: Color::LightRed,
            }
        } else {
            Self {
                background: Color::White,
                text: Color::Black,
                muted: Color::Gray,
                accent: Color::Blue,
                highlight: Color::Magenta,
                live: Color::Red,
                error: Color::Red,
            }
        }
    }

    pub(crate) fn base(&self) -> Style {
        Style::default().fg(self.text).bg(self.background)
    }

    pub(crate) fn language(&self, language: Language) -> Color {
        match language {
            Language::Tamil => Color::LightBlue,
            Language::Hindi => Color::LightYellow,
            Language::English => Color::LightGreen,
        }
    }

    pub(crate) fn key(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }
}

/// `[1] [2] [3]` with the current section highlighted.
pub(crate) fn section_buttons(count: usize, current: usize, palette: &Palette) -> Line<'static> {
    if count == 0 {
        return Line::from(Span::styled(
            "No sections",
            Style::default().fg(palette.muted),
        ));
    }
    let mut spans = Vec::with_capacity(count * 2);
    for index in 0..count {
        let style = if index == current {
            Style::default()
                .fg(palette.background)
                .bg(palette.highlight)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(palette.text)
        };
        spans.push(Span::styled(format!("[{}]", index + 1), style));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// A band of `height` rows vertically centered in `area`.
pub(crate) fn centered_band(height: u16, area: Rect) -> Rect {
    let height = height.min(area.height);
    Rect {
        x: area.x,
        y: area.y + (area.height - height) / 2,
        width: area.width,
        height,
    }
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}
