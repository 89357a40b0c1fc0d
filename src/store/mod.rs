//! Vector indexing backends.
//!
//! The ingestion pipeline only needs two capabilities from a backend: build an
//! index from a batch of [`Document`]s and an [`EmbeddingProvider`], and persist
//! that index into a directory. [`sqlite::SqliteVecBackend`] is the bundled
//! implementation (SQLite + sqlite-vec).

pub mod schema;
pub mod sqlite;

use std::path::Path;

use anyhow::Result;

use crate::embedding::EmbeddingProvider;
use crate::ingest::Document;

pub use sqlite::{SqliteVecBackend, SqliteVecIndex, INDEX_FILE};

/// Builds a [`VectorIndex`] by embedding documents.
pub trait IndexBackend {
    type Index: VectorIndex;

    /// Embed every document and return the populated index. Document order is preserved.
    fn build(&self, documents: Vec<Document>, embedder: &dyn EmbeddingProvider)
        -> Result<Self::Index>;
}

/// Handle to a built index.
pub trait VectorIndex {
    /// Persist the index into `dir`, replacing any index previously saved there.
    fn save(&self, dir: &Path) -> Result<()>;

    /// Number of indexed documents.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
