//! SQLite + sqlite-vec index backend.
//!
//! Indexes are built in an in-memory database and written to
//! `<dir>/`[`INDEX_FILE`] with `VACUUM INTO`, which produces a compact,
//! self-contained file.

use std::path::{Path, PathBuf};
use std::sync::Once;

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use rusqlite::{params, Connection, OpenFlags, Transaction};
use sqlite_vec::sqlite3_vec_init;

use super::schema::{self, IndexMeta, SCHEMA_VERSION};
use super::{IndexBackend, VectorIndex};
use crate::embedding::EmbeddingProvider;
use crate::ingest::Document;

/// File name of a persisted index inside its directory.
pub const INDEX_FILE: &str = "index.db";

const DEFAULT_BATCH_SIZE: usize = 32;

static SQLITE_VEC_INIT: Once = Once::new();

/// Register the sqlite-vec extension globally. Safe to call multiple times.
pub fn load_sqlite_vec() {
    SQLITE_VEC_INIT.call_once(|| unsafe {
        rusqlite::ffi::sqlite3_auto_extension(Some(std::mem::transmute(
            sqlite3_vec_init as *const (),
        )));
    });
}

/// Encode a vector as the little-endian f32 blob vec0 expects.
pub fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|x| x.to_le_bytes()).collect()
}

/// Builds [`SqliteVecIndex`]es, embedding documents in fixed-size batches.
pub struct SqliteVecBackend {
    batch_size: usize,
    progress: ProgressBar,
}

impl Default for SqliteVecBackend {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE)
    }
}

impl SqliteVecBackend {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
            progress: ProgressBar::hidden(),
        }
    }

    /// Report embedding progress (one tick per document) on `progress`.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }
}

impl IndexBackend for SqliteVecBackend {
    type Index = SqliteVecIndex;

    fn build(
        &self,
        documents: Vec<Document>,
        embedder: &dyn EmbeddingProvider,
    ) -> Result<SqliteVecIndex> {
        let dimensions = embedder.dimensions();
        anyhow::ensure!(dimensions > 0, "embedding provider reports zero dimensions");

        load_sqlite_vec();
        let mut conn =
            Connection::open_in_memory().context("failed to open in-memory database")?;
        schema::init_schema(&conn, dimensions).context("failed to initialize index schema")?;

        let meta = IndexMeta {
            schema_version: SCHEMA_VERSION,
            embedding_model: embedder.model_name().to_string(),
            dimensions,
            document_count: documents.len(),
            created_at: chrono::Utc::now().to_rfc3339(),
        };

        self.progress.set_length(documents.len() as u64);
        let filled = conn.transaction().map_err(anyhow::Error::from).and_then(|tx| {
            self.embed_into(&tx, &documents, embedder, dimensions)?;
            schema::write_meta(&tx, &meta)?;
            tx.commit()?;
            Ok(())
        });
        // Cleared on the failure path as well.
        self.progress.finish_and_clear();
        filled?;

        tracing::info!(
            documents = meta.document_count,
            model = %meta.embedding_model,
            dimensions,
            "index built"
        );

        Ok(SqliteVecIndex {
            conn,
            len: documents.len(),
            origin: None,
        })
    }
}

impl SqliteVecBackend {
    /// Embed `documents` batch by batch and insert them with their vectors.
    fn embed_into(
        &self,
        tx: &Transaction,
        documents: &[Document],
        embedder: &dyn EmbeddingProvider,
        dimensions: usize,
    ) -> Result<()> {
        for (batch_no, chunk) in documents.chunks(self.batch_size).enumerate() {
            let texts: Vec<&str> = chunk.iter().map(|d| d.content.as_str()).collect();
            let vectors = embedder
                .embed_batch(&texts)
                .with_context(|| format!("embedding batch {batch_no} failed"))?;
            anyhow::ensure!(
                vectors.len() == chunk.len(),
                "embedding provider returned {} vectors for {} texts",
                vectors.len(),
                chunk.len()
            );

            for (offset, (doc, vector)) in chunk.iter().zip(&vectors).enumerate() {
                anyhow::ensure!(
                    vector.len() == dimensions,
                    "embedding has {} dimensions, expected {dimensions}",
                    vector.len()
                );
                insert_document(tx, batch_no * self.batch_size + offset, doc, vector)?;
            }

            self.progress.inc(chunk.len() as u64);
            tracing::debug!(batch = batch_no, size = chunk.len(), "batch embedded");
        }
        Ok(())
    }
}

fn insert_document(
    tx: &Transaction,
    position: usize,
    doc: &Document,
    vector: &[f32],
) -> Result<()> {
    let id = uuid::Uuid::now_v7().to_string();
    let metadata = serde_json::to_string(&doc.metadata)?;

    tx.execute(
        "INSERT INTO documents (id, position, content, metadata) VALUES (?1, ?2, ?3, ?4)",
        params![id, position as i64, doc.content, metadata],
    )?;
    tx.execute(
        "INSERT INTO documents_vec (id, embedding) VALUES (?1, ?2)",
        params![id, embedding_to_bytes(vector)],
    )?;
    Ok(())
}

/// An index backed by a SQLite database with a vec0 table.
pub struct SqliteVecIndex {
    conn: Connection,
    len: usize,
    /// File this index was loaded from, if any.
    origin: Option<PathBuf>,
}

impl std::fmt::Debug for SqliteVecIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteVecIndex")
            .field("len", &self.len)
            .field("origin", &self.origin)
            .finish()
    }
}

impl SqliteVecIndex {
    /// Open an index previously written by [`VectorIndex::save`].
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let path = dir.as_ref().join(INDEX_FILE);
        anyhow::ensure!(path.exists(), "no index found at {}", path.display());

        load_sqlite_vec();
        let conn = Connection::open_with_flags(&path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .with_context(|| format!("failed to open index at {}", path.display()))?;

        let meta = schema::read_meta(&conn).context("failed to read index metadata")?;
        anyhow::ensure!(
            meta.schema_version == SCHEMA_VERSION,
            "unsupported index schema version {} (expected {SCHEMA_VERSION})",
            meta.schema_version
        );

        let len: i64 = conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        tracing::debug!(path = %path.display(), documents = len, "index loaded");

        Ok(Self {
            conn,
            len: len as usize,
            origin: Some(path),
        })
    }

    pub fn meta(&self) -> Result<IndexMeta> {
        Ok(schema::read_meta(&self.conn)?)
    }

    /// All documents in their original order.
    pub fn documents(&self) -> Result<Vec<Document>> {
        let mut stmt = self
            .conn
            .prepare("SELECT content, metadata FROM documents ORDER BY position")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(content, metadata)| {
                Ok(Document {
                    content,
                    metadata: serde_json::from_str(&metadata)
                        .context("corrupt document metadata")?,
                })
            })
            .collect()
    }

    /// Number of stored vectors.
    pub fn vector_count(&self) -> Result<usize> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM documents_vec", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

impl VectorIndex for SqliteVecIndex {
    fn save(&self, dir: &Path) -> Result<()> {
        let target = dir.join(INDEX_FILE);
        let tmp_path = target.with_extension("db.tmp");
        let tmp_str = tmp_path
            .to_str()
            .with_context(|| format!("index path is not valid UTF-8: {}", target.display()))?;

        if let Some(origin) = &self.origin {
            if same_file(origin, &target) {
                return Ok(());
            }
        }

        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create directory {}", dir.display()))?;

        // VACUUM INTO refuses an existing file; a leftover tmp is from an aborted save.
        if tmp_path.exists() {
            std::fs::remove_file(&tmp_path)
                .with_context(|| format!("failed to clear stale {}", tmp_path.display()))?;
        }

        if let Err(e) = self.conn.execute("VACUUM INTO ?1", [tmp_str]) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(e).with_context(|| format!("failed to write index to {}", tmp_path.display()));
        }

        std::fs::rename(&tmp_path, &target)
            .with_context(|| format!("failed to move index into place at {}", target.display()))?;

        tracing::info!(path = %target.display(), documents = self.len, "index saved");
        Ok(())
    }

    fn len(&self) -> usize {
        self.len
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
