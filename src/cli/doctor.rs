//! CLI `doctor` command: report configuration, model files, and index status.

use anyhow::{Context, Result};

use cyberguard::config::{expand_tilde, CyberguardConfig};
use cyberguard::embedding::local::{MODEL_FILE, TOKENIZER_FILE};
use cyberguard::store::{SqliteVecIndex, VectorIndex, INDEX_FILE};

/// Print a health report for the current configuration.
pub fn doctor(config: &CyberguardConfig) -> Result<()> {
    let cache_dir = expand_tilde(&config.embedding.cache_dir);
    let store_dir = config.resolved_store_path();

    println!("Cyberguard Health Report");
    println!("========================");
    println!();
    println!("Embedding:");
    println!("  Provider:        {}", config.embedding.provider);
    println!("  Model:           {}", config.embedding.model);
    for file in [MODEL_FILE, TOKENIZER_FILE] {
        let status = if cache_dir.join(file).exists() { "present" } else { "MISSING" };
        println!("  {:<16} {status}", format!("{file}:"));
    }
    println!("  GPU layers:      {}", describe_layers(config.gpu_layers()));
    println!();

    println!("Vector store:      {}", store_dir.display());
    if !store_dir.join(INDEX_FILE).exists() {
        println!("  Status:          not built yet. Run `cyberguard ingest <csv>`.");
        return Ok(());
    }

    let index = SqliteVecIndex::load(&store_dir).context("failed to open index (may be corrupt)")?;
    let meta = index.meta()?;
    println!("  Documents:       {}", index.len());
    println!("  Vectors:         {}", index.vector_count()?);
    println!("  Dimensions:      {}", meta.dimensions);
    println!("  Created:         {}", meta.created_at);
    println!("  Embedding model: {}", meta.embedding_model);
    if meta.embedding_model != config.embedding.model {
        println!("  WARNING: model mismatch! Re-run `cyberguard ingest` to rebuild the index.");
    }

    Ok(())
}

fn describe_layers(layers: i32) -> String {
    match layers {
        0 => "0 (CPU only)".into(),
        -1 => "-1 (offload all layers)".into(),
        n => n.to_string(),
    }
}
