use std::path::PathBuf;
use std::time::Duration;

use lyrics_live::cli::{Args, Route};
use lyrics_live::config::{load_config, Config, FileConfig};

fn make_args(database: Option<PathBuf>) -> Args {
    Args {
        route: Route::Controller,
        database,
        config: None,
    }
}

fn default_db() -> PathBuf {
    PathBuf::from("/home/test/.lyrics-live/lyrics.sqlite")
}

#[test]
fn test_defaults_when_nothing_set() {
    let config = Config::resolve(None, &make_args(None), default_db());
    assert_eq!(config.database, default_db());
    assert_eq!(config.poll_interval, Duration::from_millis(200));
    assert_eq!(config.placeholder, "Shalom");
    assert_eq!(config.log_level, "info");
}

#[test]
fn test_toml_overrides_default() {
    let file = FileConfig {
        database: Some(PathBuf::from("/srv/church.sqlite")),
        poll_interval_ms: Some(50),
        placeholder: Some("Welcome".into()),
        log_level: Some("debug".into()),
    };
    let config = Config::resolve(Some(file), &make_args(None), default_db());
    assert_eq!(config.database, PathBuf::from("/srv/church.sqlite"));
    assert_eq!(config.poll_interval, Duration::from_millis(50));
    assert_eq!(config.placeholder, "Welcome");
    assert_eq!(config.log_level, "debug");
}

#[test]
fn test_cli_overrides_toml() {
    let file = FileConfig {
        database: Some(PathBuf::from("/srv/church.sqlite")),
        ..FileConfig::default()
    };
    let args = make_args(Some(PathBuf::from("/tmp/other.sqlite")));
    let config = Config::resolve(Some(file), &args, default_db());
    assert_eq!(config.database, PathBuf::from("/tmp/other.sqlite")); // CLI wins
}

#[test]
fn test_blank_placeholder_and_zero_interval_fall_back() {
    let file = FileConfig {
        poll_interval_ms: Some(0),
        placeholder: Some("   ".into()),
        ..FileConfig::default()
    };
    let config = Config::resolve(Some(file), &make_args(None), default_db());
    assert_eq!(config.poll_interval, Duration::from_millis(200));
    assert_eq!(config.placeholder, "Shalom");
}

#[test]
fn test_toml_parse() {
    let toml_str = "database = \"/data/lyrics.sqlite\"\nplaceholder = \"Hallelujah\"\n";
    let parsed: FileConfig = toml::from_str(toml_str).unwrap();
    assert_eq!(parsed.database, Some(PathBuf::from("/data/lyrics.sqlite")));
    assert_eq!(parsed.placeholder.as_deref(), Some("Hallelujah"));
    assert_eq!(parsed.poll_interval_ms, None);
}

#[test]
fn test_toml_unknown_fields_ignored() {
    let toml_str = "log_level = \"warn\"\nprojector_brightness = 11\n";
    let parsed: FileConfig = toml::from_str(toml_str).unwrap();
    assert_eq!(parsed.log_level.as_deref(), Some("warn"));
}

#[test]
fn test_load_config_reports_bad_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lyrics-live.toml");
    std::fs::write(&path, "poll_interval_ms = \"fast\"").unwrap();
    assert!(load_config(&path).is_err());
    assert!(load_config(&dir.path().join("missing.toml")).is_err());
}
