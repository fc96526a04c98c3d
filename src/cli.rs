use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "lyrics-live",
    about = "Multilingual worship lyrics: a controller to curate and broadcast, a display to project",
    long_about = None,
    version,
)]
pub struct Args {
    /// Which surface to run
    #[arg(value_enum, default_value_t = Route::Controller)]
    pub route: Route,

    /// Shared SQLite database [default: ~/.lyrics-live/lyrics.sqlite]
    #[arg(short, long, value_name = "FILE")]
    pub database: Option<PathBuf>,

    /// Path to TOML config file (overrides default search: ./lyrics-live.toml, <config dir>/lyrics-live/config.toml)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// The two surfaces sharing one data layer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Route {
    /// Operator view: song list, preview and broadcast controls
    Controller,
    /// Projector view: renders whatever the controller has marked live
    Display,
}
