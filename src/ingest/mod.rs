//! CSV-to-document ingestion pipeline.
//!
//! [`ingest`] is the single entry point: check the input exists, parse it into an
//! [`EventTable`], render one [`Document`] per row, hand the batch to an
//! [`IndexBackend`], and persist the resulting index. Every step runs in order on
//! the caller's thread and any failure aborts the run.

pub mod document;
pub mod table;

use std::path::Path;

use crate::embedding::EmbeddingProvider;
use crate::error::IngestError;
use crate::store::{IndexBackend, VectorIndex};

pub use document::{
    render_document, Document, DocumentMetadata, EventField, NOT_AVAILABLE, OPENING_SENTENCE,
};
pub use table::{is_missing, normalize_column, EventRow, EventTable};

/// Knobs for a single ingestion run.
#[derive(Debug, Clone, Copy, Default)]
pub struct IngestOptions {
    /// Drop rows whose document would contain only [`OPENING_SENTENCE`].
    /// Off by default, so every data row yields a document.
    pub skip_uninformative_rows: bool,
}

/// Render every row of `table`, in file order.
pub fn build_documents(
    table: &EventTable,
    source_csv: &str,
    options: IngestOptions,
) -> Vec<Document> {
    let documents: Vec<Document> = table
        .rows()
        .map(|row| render_document(&row, source_csv))
        .filter(|doc| !(options.skip_uninformative_rows && doc.is_uninformative()))
        .collect();

    let dropped = table.len() - documents.len();
    if dropped > 0 {
        tracing::debug!(dropped, "skipped rows without event fields");
    }
    documents
}

/// Ingest a CSV of security events into a vector index persisted at `vector_store_path`.
///
/// Fails with [`IngestError::NotFound`] before touching the file system when
/// `csv_path` does not exist, and with [`IngestError::NoContent`] before the
/// embedder is called when no documents were produced.
pub fn ingest<B: IndexBackend>(
    csv_path: &Path,
    vector_store_path: &Path,
    embedder: &dyn EmbeddingProvider,
    backend: &B,
) -> Result<B::Index, IngestError> {
    ingest_with_options(
        csv_path,
        vector_store_path,
        embedder,
        backend,
        IngestOptions::default(),
    )
}

/// [`ingest`] with explicit [`IngestOptions`].
pub fn ingest_with_options<B: IndexBackend>(
    csv_path: &Path,
    vector_store_path: &Path,
    embedder: &dyn EmbeddingProvider,
    backend: &B,
    options: IngestOptions,
) -> Result<B::Index, IngestError> {
    tracing::info!(csv = %csv_path.display(), "ingesting CSV");

    if !csv_path.exists() {
        return Err(IngestError::NotFound {
            path: csv_path.to_path_buf(),
        });
    }

    let table = EventTable::from_path(csv_path)?;
    let source_csv = csv_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let documents = build_documents(&table, &source_csv, options);
    if documents.is_empty() {
        return Err(IngestError::NoContent {
            path: csv_path.to_path_buf(),
        });
    }
    let document_count = documents.len();

    let index = backend
        .build(documents, embedder)
        .map_err(IngestError::Backend)?;

    std::fs::create_dir_all(vector_store_path).map_err(|source| IngestError::CreateDir {
        path: vector_store_path.to_path_buf(),
        source,
    })?;
    index.save(vector_store_path).map_err(IngestError::Backend)?;

    tracing::info!(
        documents = document_count,
        store = %vector_store_path.display(),
        "vector store created"
    );
    Ok(index)
}
