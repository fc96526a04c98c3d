use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::{Frame, Terminal};

/// How long to wait for input before draining subscriptions again.
const TICK: Duration = Duration::from_millis(250);

/// A full-screen view driven by [`run_surface`].
pub trait Surface {
    /// Pull whatever the subscriptions delivered since the last tick.
    fn refresh(&mut self) -> Result<()>;
    fn draw(&self, frame: &mut Frame);
    /// Handle a Ctrl chord. Returns whether it was consumed.
    fn handle_ctrl(&mut self, code: KeyCode) -> Result<bool>;
    /// Handle a plain key press. Returns whether to exit.
    fn handle_key(&mut self, code: KeyCode) -> Result<bool>;
}

/// Spin up the terminal backend, enter the draw loop, and keep processing input
/// until the surface asks to quit. The terminal is restored on every exit path.
pub fn run_surface<S: Surface>(surface: &mut S) -> Result<()> {
    let mut stdout = io::stdout();
    enable_raw_mode().context("failed to enable raw mode")?;
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal backend")?;

    let result = event_loop(&mut terminal, surface);

    cleanup_terminal(&mut terminal)?;
    result
}

fn event_loop<S: Surface>(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    surface: &mut S,
) -> Result<()> {
    loop {
        surface.refresh()?;
        terminal
            .draw(|frame| surface.draw(frame))
            .context("failed to draw frame")?;

        if event::poll(TICK).context("event polling failed")? {
            if let Event::Key(key_event) = event::read().context("failed to read event")? {
                if key_event.kind == KeyEventKind::Press {
                    if key_event.modifiers.contains(KeyModifiers::CONTROL) {
                        if key_event.code == KeyCode::Char('c') {
                            return Ok(());
                        }
                        if surface.handle_ctrl(key_event.code)? {
                            continue;
                        }
                    }

                    if surface.handle_key(key_event.code)? {
                        return Ok(());
                    }
                }
            }
        }
    }
}

fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal
        .show_cursor()
        .context("failed to restore cursor visibility")
}
