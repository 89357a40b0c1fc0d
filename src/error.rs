//! Failure modes of a single ingestion run. Every variant is fatal to the run.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The input CSV does not exist. Raised before any parsing.
    #[error("CSV file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The file produced no documents, so the indexing backend was never called.
    #[error("no documents created from {}", path.display())]
    NoContent { path: PathBuf },

    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A record that cannot be rendered (e.g. more fields than the header).
    #[error("malformed row at line {line}: {message}")]
    Row { line: u64, message: String },

    #[error("failed to create directory {}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Embedding, index construction, or persistence failed.
    #[error("indexing backend failed: {0:#}")]
    Backend(anyhow::Error),
}
