//! Ratatui front-ends. Both surfaces run on the same terminal loop; the
//! controller curates and broadcasts, the display only renders.

mod app;
mod display;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::ControllerApp;
pub use display::DisplayView;
pub use terminal::{run_surface, Surface};
