use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::Deserialize;

const DEFAULT_POLL_INTERVAL_MS: u64 = 200;
const DEFAULT_PLACEHOLDER: &str = "Shalom";
const DEFAULT_LOG_LEVEL: &str = "info";
const CONFIG_FILE_NAME: &str = "lyrics-live.toml";

#[derive(Deserialize, Default, Debug)]
pub struct FileConfig {
    pub database: Option<PathBuf>,
    pub poll_interval_ms: Option<u64>,
    pub placeholder: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database: PathBuf,
    pub poll_interval: Duration,
    pub placeholder: String,
    pub log_level: String,
}

impl Config {
    /// Layer CLI flags over the config file over built-in defaults.
    /// `default_database` is only used when neither names a database.
    pub fn resolve(
        file: Option<FileConfig>,
        args: &crate::cli::Args,
        default_database: PathBuf,
    ) -> Self {
        let file = file.unwrap_or_default();
        Config {
            database: args
                .database
                .clone()
                .or(file.database)
                .unwrap_or(default_database),
            poll_interval: Duration::from_millis(
                file.poll_interval_ms
                    .filter(|ms| *ms > 0)
                    .unwrap_or(DEFAULT_POLL_INTERVAL_MS),
            ),
            placeholder: file
                .placeholder
                .filter(|text| !text.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PLACEHOLDER.to_string()),
            log_level: file
                .log_level
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        }
    }
}

pub fn find_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_owned());
    }
    let cwd_config = PathBuf::from(CONFIG_FILE_NAME);
    if cwd_config.exists() {
        return Some(cwd_config);
    }
    if let Some(dirs) = ProjectDirs::from("", "", "lyrics-live") {
        let user_config = dirs.config_dir().join("config.toml");
        if user_config.exists() {
            return Some(user_config);
        }
    }
    None
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

pub fn load_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: FileConfig = toml::from_str(&content)?;
    Ok(config)
}
