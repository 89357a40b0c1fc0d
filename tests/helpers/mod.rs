#![allow(dead_code)]

use anyhow::Result;
use cyberguard::embedding::EmbeddingProvider;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Dimensions produced by [`CountingEmbedder`].
pub const TEST_DIM: usize = 16;

/// Deterministic embedder that records how many texts it was asked to embed.
#[derive(Default)]
pub struct CountingEmbedder {
    calls: AtomicUsize,
}

impl CountingEmbedder {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EmbeddingProvider for CountingEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut v = vec![0.0f32; TEST_DIM];
        for (i, b) in text.bytes().enumerate() {
            v[(i + b as usize) % TEST_DIM] += 1.0;
        }
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            v.iter_mut().for_each(|x| *x /= norm);
        }
        Ok(v)
    }

    fn dimensions(&self) -> usize {
        TEST_DIM
    }

    fn model_name(&self) -> &str {
        "counting-test"
    }
}

/// Embedder that always fails.
pub struct FailingEmbedder;

impl EmbeddingProvider for FailingEmbedder {
    fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        anyhow::bail!("embedding service unavailable")
    }

    fn dimensions(&self) -> usize {
        TEST_DIM
    }

    fn model_name(&self) -> &str {
        "failing-test"
    }
}

/// Write `contents` to `dir/name` and return the path.
pub fn write_csv(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}
