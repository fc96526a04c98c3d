//! A small document store on top of the `documents` table. Each row is one
//! JSON body in a named collection, keyed by a random id assigned on insert.
//! Queries order on a JSON field through SQLite's JSON1 functions, so the
//! schema never has to know which fields a collection uses.

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

/// Length of the random identifiers handed out on insert.
const DOCUMENT_ID_LEN: usize = 20;

/// Insert a document into `collection` and return the id the store assigned.
///
/// The body is stored verbatim. `created_at` on the row is bookkeeping for the
/// store itself; callers that want a timestamp in the document add their own.
pub fn insert_document(conn: &Connection, collection: &str, data: &Value) -> Result<String> {
    let id = generate_id();
    let body = serde_json::to_string(data).context("failed to encode document")?;
    let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

    conn.execute(
        "INSERT INTO documents (id, collection, data, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![id, collection, body, created_at],
    )
    .context("failed to insert document")?;

    tracing::debug!(collection, id = %id, "inserted document");
    Ok(id)
}

/// Every document in `collection` that has `order_by`, ordered by that field
/// ascending with binary collation. Documents without the field are left out.
pub fn query_documents(
    conn: &Connection,
    collection: &str,
    order_by: &str,
) -> Result<Vec<(String, Value)>> {
    let path = format!("$.{order_by}");
    let mut stmt = conn
        .prepare(
            "SELECT id, data
             FROM documents
             WHERE collection = ?1 AND json_extract(data, ?2) IS NOT NULL
             ORDER BY json_extract(data, ?2), id",
        )
        .context("failed to prepare document query")?;

    let rows = stmt
        .query_map(params![collection, path], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })
        .context("failed to iterate documents")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect documents")?;

    rows.into_iter()
        .map(|(id, body)| {
            let data = serde_json::from_str(&body)
                .with_context(|| format!("document {id} is not valid JSON"))?;
            Ok((id, data))
        })
        .collect()
}

/// Fetch one document, or `None` when no document has that id.
pub fn get_document(conn: &Connection, collection: &str, id: &str) -> Result<Option<Value>> {
    let body: Option<String> = conn
        .query_row(
            "SELECT data FROM documents WHERE collection = ?1 AND id = ?2",
            params![collection, id],
            |row| row.get(0),
        )
        .optional()
        .context("failed to fetch document")?;

    body.map(|body| {
        serde_json::from_str(&body).with_context(|| format!("document {id} is not valid JSON"))
    })
    .transpose()
}

/// Random alphanumeric id. A collision fails the insert on the primary key.
fn generate_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(DOCUMENT_ID_LEN)
        .map(char::from)
        .collect()
}
