//! SQL DDL and metadata for a persisted index.
//!
//! An index holds `documents` (text plus JSON metadata), `documents_vec` (a vec0
//! table sized to the embedding dimensions) and `index_meta` key/value pairs.

use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

/// Layout version written into `index_meta`.
pub const SCHEMA_VERSION: u32 = 1;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    id TEXT PRIMARY KEY,
    position INTEGER NOT NULL UNIQUE,
    content TEXT NOT NULL,
    metadata TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS index_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Create all tables for vectors of `dimensions` floats. Idempotent.
pub fn init_schema(conn: &Connection, dimensions: usize) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    // vec0 needs the dimension inline in its declaration
    conn.execute_batch(&format!(
        "CREATE VIRTUAL TABLE IF NOT EXISTS documents_vec USING vec0(
            id TEXT PRIMARY KEY,
            embedding FLOAT[{dimensions}]
        );"
    ))?;
    Ok(())
}

/// Descriptive record stored with every index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexMeta {
    pub schema_version: u32,
    pub embedding_model: String,
    pub dimensions: usize,
    pub document_count: usize,
    pub created_at: String,
}

pub fn write_meta(conn: &Connection, meta: &IndexMeta) -> rusqlite::Result<()> {
    let entries = [
        ("schema_version", meta.schema_version.to_string()),
        ("embedding_model", meta.embedding_model.clone()),
        ("dimensions", meta.dimensions.to_string()),
        ("document_count", meta.document_count.to_string()),
        ("created_at", meta.created_at.clone()),
    ];
    for (key, value) in entries {
        conn.execute(
            "INSERT OR REPLACE INTO index_meta (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
    }
    Ok(())
}

fn get_meta_value(conn: &Connection, key: &str) -> rusqlite::Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM index_meta WHERE key = ?1",
        [key],
        |row| row.get::<_, String>(0),
    )
    .optional()
}

/// Read the stored metadata. Missing or unparsable numeric keys read as `0`.
pub fn read_meta(conn: &Connection) -> rusqlite::Result<IndexMeta> {
    let number = |key: &str| -> rusqlite::Result<usize> {
        Ok(get_meta_value(conn, key)?
            .and_then(|v| v.parse().ok())
            .unwrap_or(0))
    };

    Ok(IndexMeta {
        schema_version: number("schema_version")? as u32,
        embedding_model: get_meta_value(conn, "embedding_model")?.unwrap_or_default(),
        dimensions: number("dimensions")?,
        document_count: number("document_count")?,
        created_at: get_meta_value(conn, "created_at")?.unwrap_or_default(),
    })
}
