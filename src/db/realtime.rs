//! Realtime key-value store on the `realtime` table. Values are JSON and are
//! addressed by slash-separated paths: the first segment picks the row, the
//! rest walk into the stored object. Writes at a sub-path touch only that
//! field, which is what lets two controllers flip different fields of `live`
//! without clobbering each other.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::{Map, Value};

use crate::error::StoreError;

/// Key holding the shared broadcast settings.
pub const LIVE_KEY: &str = "live";
/// Key holding the id of the song selected for display.
pub const PREVIEW_KEY: &str = "preview";

/// A realtime path split into its top-level key and the nested field names
/// below it. `live/currentIndex` addresses the `currentIndex` field of the
/// value stored under `live`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealtimePath<'a> {
    pub key: &'a str,
    pub fields: Vec<&'a str>,
}

impl<'a> RealtimePath<'a> {
    pub fn parse(path: &'a str) -> Result<Self, StoreError> {
        let mut segments = path.trim_matches('/').split('/');
        let key = segments
            .next()
            .filter(|segment| !segment.is_empty())
            .ok_or_else(|| StoreError::InvalidPath(path.to_string()))?;
        let fields: Vec<&str> = segments.collect();
        if fields.iter().any(|segment| segment.is_empty()) {
            return Err(StoreError::InvalidPath(path.to_string()));
        }
        Ok(Self { key, fields })
    }
}

/// Write `value` at `path`. A bare key is overwritten whole; a nested path
/// replaces only that field and keeps its siblings. Writing `null` deletes.
pub fn write_value(conn: &Connection, path: &str, value: &Value) -> Result<()> {
    let target = RealtimePath::parse(path)?;

    if target.fields.is_empty() {
        if value.is_null() {
            conn.execute("DELETE FROM realtime WHERE key = ?1", params![target.key])
                .context("failed to delete realtime value")?;
        } else {
            store_raw(conn, target.key, value)?;
        }
        tracing::debug!(path, "wrote realtime value");
        return Ok(());
    }

    let tx = conn
        .unchecked_transaction()
        .context("failed to start realtime transaction")?;
    let mut root = load_raw(&tx, target.key)?.unwrap_or(Value::Null);
    set_nested(&mut root, &target.fields, value.clone());
    if root.is_null() {
        tx.execute("DELETE FROM realtime WHERE key = ?1", params![target.key])
            .context("failed to delete realtime value")?;
    } else {
        store_raw(&tx, target.key, &root)?;
    }
    tx.commit().context("failed to commit realtime write")?;

    tracing::debug!(path, "wrote realtime field");
    Ok(())
}

/// Read the value at `path`, or `None` when nothing is stored there.
pub fn read_value(conn: &Connection, path: &str) -> Result<Option<Value>> {
    let target = RealtimePath::parse(path)?;
    let Some(root) = load_raw(conn, target.key)? else {
        return Ok(None);
    };

    let mut current = &root;
    for field in &target.fields {
        match current.get(*field) {
            Some(next) => current = next,
            None => return Ok(None),
        }
    }
    if current.is_null() {
        Ok(None)
    } else {
        Ok(Some(current.clone()))
    }
}

fn load_raw(conn: &Connection, key: &str) -> Result<Option<Value>> {
    let body: Option<String> = conn
        .query_row(
            "SELECT value FROM realtime WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .context("failed to read realtime value")?;

    body.map(|body| {
        serde_json::from_str(&body).with_context(|| format!("realtime value '{key}' is not JSON"))
    })
    .transpose()
}

fn store_raw(conn: &Connection, key: &str, value: &Value) -> Result<()> {
    let body = serde_json::to_string(value).context("failed to encode realtime value")?;
    conn.execute(
        "INSERT INTO realtime (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, body],
    )
    .context("failed to write realtime value")?;
    Ok(())
}

/// Set (or with `null`, remove) a nested field, turning non-object parents
/// into objects on the way down. Objects left empty by a removal collapse to
/// `null` so the parent disappears too.
fn set_nested(node: &mut Value, fields: &[&str], value: Value) {
    let Some((first, rest)) = fields.split_first() else {
        *node = value;
        return;
    };

    if !node.is_object() {
        if value.is_null() {
            return;
        }
        *node = Value::Object(Map::new());
    }
    let Value::Object(map) = node else {
        return;
    };

    if rest.is_empty() {
        if value.is_null() {
            map.remove(*first);
        } else {
            map.insert((*first).to_string(), value);
        }
    } else {
        let child = map.entry((*first).to_string()).or_insert(Value::Null);
        set_nested(child, rest, value);
        if child.is_null() {
            map.remove(*first);
        }
    }

    if map.is_empty() {
        *node = Value::Null;
    }
}
