//! Database bootstrap. Every process, controller or display, opens the same
//! SQLite file; WAL journaling lets the pollers read while a controller
//! writes, and the busy timeout covers the short write locks.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;
use rusqlite::Connection;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".lyrics-live";
/// SQLite file shared by every controller and display process.
const DB_FILE_NAME: &str = "lyrics.sqlite";
/// How long a writer waits on another process holding the lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(2);

/// Open (creating if needed) the shared database at `path`, run lazy
/// migrations, and return a live connection.
pub fn ensure_schema(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context("failed to create data directory")?;
        }
    }

    let conn = open_connection(path)?;
    let _mode: String = conn
        .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
        .context("failed to enable WAL journaling")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS documents (
            id TEXT PRIMARY KEY,
            collection TEXT NOT NULL,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    )
    .context("failed to create documents table")?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS documents_collection ON documents (collection)",
        [],
    )
    .context("failed to create documents index")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS realtime (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        [],
    )
    .context("failed to create realtime table")?;

    Ok(conn)
}

/// Open another connection to an existing database. Subscription pollers use
/// this so they never share a handle with the writer.
pub fn open_connection(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("failed to open SQLite database at {}", path.display()))?;
    conn.busy_timeout(BUSY_TIMEOUT)
        .context("failed to set busy timeout")?;
    Ok(conn)
}

/// Default location of the shared database inside the user's home.
pub fn default_db_path() -> Result<PathBuf> {
    Ok(data_dir()?.join(DB_FILE_NAME))
}

/// Directory holding the database, the log file and the local settings.
pub fn data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}
