//! Turns cybersecurity event CSV exports into an embedded vector index.
//!
//! Each CSV row becomes a short natural-language [`Document`](ingest::Document)
//! ("A cybersecurity event was recorded. Attack Type: Phishing. ...") carrying
//! the source file name, event id and timestamp as metadata. Documents are
//! embedded and persisted by a pluggable [`IndexBackend`](store::IndexBackend).
//!
//! # Architecture
//!
//! - **Parsing**: the `csv` crate, with header names normalized to `snake_case`
//! - **Embeddings**: local ONNX Runtime with all-MiniLM-L6-v2 (384 dimensions)
//! - **Storage**: SQLite with [sqlite-vec](https://github.com/asg017/sqlite-vec),
//!   one self-contained `index.db` per store directory
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from TOML files and environment variables
//! - [`embedding`]: Text-to-vector embedding via ONNX Runtime
//! - [`error`]: Ingestion failure modes
//! - [`gpu`]: GPU offload flag handling
//! - [`ingest`]: CSV parsing, document rendering, and the ingestion pipeline
//! - [`store`]: Index backends and the sqlite-vec implementation

pub mod config;
pub mod embedding;
pub mod error;
pub mod gpu;
pub mod ingest;
pub mod store;

pub use error::IngestError;
pub use ingest::{ingest, ingest_with_options, Document, IngestOptions};
