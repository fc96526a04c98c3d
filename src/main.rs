//! Binary entry point: resolve configuration, bring up logging and the shared
//! database, then hand the terminal to whichever surface was requested.
use clap::Parser;

use lyrics_live::cli::{Args, Route};
use lyrics_live::config::{find_config_file, load_config, Config};
use lyrics_live::logging::{init_logging, LOG_FILE_NAME};
use lyrics_live::settings::SettingsStore;
use lyrics_live::{data_dir, default_db_path, ensure_schema, run_surface, ControllerApp, DisplayView};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let data_dir = data_dir()?;

    let mut config_warning = None;
    let file_config = match find_config_file(args.config.as_deref()) {
        Some(path) => match load_config(&path) {
            Ok(config) => Some(config),
            Err(err) => {
                config_warning = Some(format!("ignoring {}: {err}", path.display()));
                None
            }
        },
        None => None,
    };
    let config = Config::resolve(file_config, &args, default_db_path()?);

    init_logging(&data_dir.join(LOG_FILE_NAME), &config.log_level)?;
    if let Some(warning) = config_warning {
        tracing::warn!("{warning}");
    }
    tracing::info!(
        route = ?args.route,
        database = %config.database.display(),
        "starting lyrics-live"
    );

    let conn = ensure_schema(&config.database)?;
    let settings_store = SettingsStore::in_dir(&data_dir);
    tracing::debug!(path = %settings_store.path().display(), "local settings");

    match args.route {
        Route::Controller => {
            let mut app =
                ControllerApp::new(conn, &config.database, config.poll_interval, settings_store)?;
            run_surface(&mut app)
        }
        Route::Display => {
            let dark_theme = settings_store.load().dark_theme;
            let mut view = DisplayView::new(
                conn,
                &config.database,
                config.poll_interval,
                config.placeholder,
                dark_theme,
            )?;
            run_surface(&mut view)
        }
    }
}
