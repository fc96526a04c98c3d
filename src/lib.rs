//! Core library for the lyrics-live presentation tool.
//!
//! A controller and a display share one SQLite file: songs live in a document
//! collection, and two realtime keys (`live` and `preview`) carry what is on
//! screen. The binary only parses flags and picks a surface; everything else
//! is reachable from here.
pub mod cli;
pub mod config;
pub mod db;
pub mod display;
pub mod error;
pub mod library;
pub mod logging;
pub mod lyrics;
pub mod models;
pub mod settings;
pub mod sync;
pub mod ui;

/// Persistence entry points used by `main.rs` and the tests.
pub use db::{data_dir, default_db_path, ensure_schema};

/// Domain types the other layers pass around.
pub use models::{Alignment, BroadcastState, BroadcastUpdate, Language, Song, SongDraft};

pub use sync::BroadcastSync;

/// The interactive surfaces and the loop that drives them.
pub use ui::{run_surface, ControllerApp, DisplayView};
