//! Change subscriptions over the shared database.
//!
//! Each subscription owns a poller thread with its own connection. The thread
//! watches `PRAGMA data_version`, which moves whenever another connection
//! commits, re-reads its query when it does, and forwards the result only if
//! it differs from the last one sent. The current value is always delivered
//! first. Dropping the [`Subscription`] stops and joins the thread.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result};
use rusqlite::Connection;
use serde_json::Value;

use crate::models::Song;

use super::connection::open_connection;
use super::realtime::read_value;
use super::songs::fetch_songs;

/// Upper bound on how long `Drop` waits between stop-flag checks.
const STOP_CHECK: Duration = Duration::from_millis(25);

/// A live stream of snapshots. Unsubscribes when dropped.
pub struct Subscription<T> {
    receiver: Receiver<T>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    label: &'static str,
}

impl<T> Subscription<T>
where
    T: PartialEq + Clone + Send + 'static,
{
    fn spawn<F>(db_path: &Path, interval: Duration, label: &'static str, mut read: F) -> Result<Self>
    where
        F: FnMut(&Connection) -> Result<T> + Send + 'static,
    {
        let conn = open_connection(db_path)?;
        let mut version = data_version(&conn)?;
        let initial = read(&conn).with_context(|| format!("failed initial read for {label}"))?;

        let (sender, receiver) = mpsc::channel();
        // The receiver is still held here, so this cannot fail.
        let _ = sender.send(initial.clone());

        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name(format!("watch-{label}"))
            .spawn(move || {
                let mut last = initial;
                while sleep_unless_stopped(&thread_stop, interval) {
                    let current = match data_version(&conn) {
                        Ok(current) => current,
                        Err(err) => {
                            tracing::warn!(label, error = %err, "failed to poll data version");
                            continue;
                        }
                    };
                    if current == version {
                        continue;
                    }
                    version = current;

                    match read(&conn) {
                        Ok(snapshot) if snapshot != last => {
                            last = snapshot.clone();
                            if sender.send(snapshot).is_err() {
                                break;
                            }
                        }
                        Ok(_) => {}
                        Err(err) => {
                            tracing::warn!(label, error = %err, "subscription read failed");
                        }
                    }
                }
                tracing::debug!(label, "subscription poller stopped");
            })
            .context("failed to spawn subscription thread")?;

        tracing::debug!(label, "subscribed");
        Ok(Self {
            receiver,
            stop,
            handle: Some(handle),
            label,
        })
    }

    /// Next pending snapshot, without blocking.
    pub fn try_recv(&self) -> Option<T> {
        self.receiver.try_recv().ok()
    }

    /// Drain everything pending and keep only the newest snapshot.
    pub fn latest(&self) -> Option<T> {
        let mut newest = None;
        while let Some(snapshot) = self.try_recv() {
            newest = Some(snapshot);
        }
        newest
    }

    /// Block up to `timeout` for the next snapshot.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<T> {
        match self.receiver.recv_timeout(timeout) {
            Ok(snapshot) => Some(snapshot),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!(label = self.label, "subscription poller panicked");
            }
        }
        tracing::debug!(label = self.label, "unsubscribed");
    }
}

/// Stream the title-ordered song list. Every change delivers the full list.
pub fn watch_songs(db_path: &Path, interval: Duration) -> Result<Subscription<Vec<Song>>> {
    Subscription::spawn(db_path, interval, "songs", fetch_songs)
}

/// Stream the value stored under a realtime path. `None` means the value is
/// absent or was deleted.
pub fn watch_value(
    db_path: &Path,
    path: &str,
    interval: Duration,
) -> Result<Subscription<Option<Value>>> {
    let label = match path {
        super::realtime::LIVE_KEY => "live",
        super::realtime::PREVIEW_KEY => "preview",
        _ => "value",
    };
    let path = path.to_string();
    Subscription::spawn(db_path, interval, label, move |conn| read_value(conn, &path))
}

fn data_version(conn: &Connection) -> Result<i64> {
    conn.query_row("PRAGMA data_version", [], |row| row.get(0))
        .context("failed to read data_version")
}

/// Sleep for `interval` in short slices. Returns `false` once `stop` is set.
fn sleep_unless_stopped(stop: &AtomicBool, interval: Duration) -> bool {
    let mut remaining = interval;
    while !remaining.is_zero() {
        if stop.load(Ordering::SeqCst) {
            return false;
        }
        let slice = remaining.min(STOP_CHECK);
        thread::sleep(slice);
        remaining -= slice;
    }
    !stop.load(Ordering::SeqCst)
}
