//! CLI `ingest` command: embed a CSV file and persist the index.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;

use cyberguard::config::CyberguardConfig;
use cyberguard::embedding::{self, EmbeddingProvider};
use cyberguard::store::{SqliteVecBackend, VectorIndex};

/// Run the ingestion pipeline with the configured embedding provider.
pub async fn ingest(config: &CyberguardConfig, csv: PathBuf, store: Option<PathBuf>) -> Result<()> {
    let store = store.unwrap_or_else(|| config.resolved_store_path());

    tracing::info!(gpu_layers = config.gpu_layers(), "runtime selected");

    let provider: Arc<dyn EmbeddingProvider> = Arc::from(
        embedding::create_provider(&config.embedding)
            .context("failed to create embedding provider")?,
    );

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  {bar:40.cyan/blue} {pos}/{len} ({eta})")
            .expect("valid template")
            .progress_chars("##-"),
    );
    let backend = SqliteVecBackend::new(config.embedding.batch_size).with_progress(pb);
    let options = config.ingest_options();

    let (csv_display, store_display) = (csv.display().to_string(), store.display().to_string());
    let index = tokio::task::spawn_blocking(move || {
        cyberguard::ingest_with_options(&csv, &store, provider.as_ref(), &backend, options)
    })
    .await?
    .with_context(|| format!("failed to ingest {csv_display}"))?;

    println!("Indexed {} documents from {csv_display}", index.len());
    println!("Vector store: {store_display}");
    Ok(())
}
