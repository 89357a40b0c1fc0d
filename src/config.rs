use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::ingest::IngestOptions;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CyberguardConfig {
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
    pub embedding: EmbeddingConfig,
    pub ingest: IngestConfig,
    pub runtime: RuntimeConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory the vector index is persisted into.
    pub store_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: String,
    pub model: String,
    pub cache_dir: String,
    /// Texts per inference call while building an index.
    pub batch_size: usize,
    pub max_seq_len: usize,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct IngestConfig {
    /// Drop rows that carry none of the recognized event fields.
    pub skip_uninformative_rows: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct RuntimeConfig {
    /// GPU offload flag, see [`crate::gpu::choose_layer_count`].
    pub use_gpu: Option<String>,
}

impl Default for CyberguardConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            storage: StorageConfig::default(),
            embedding: EmbeddingConfig::default(),
            ingest: IngestConfig::default(),
            runtime: RuntimeConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let store_path = default_cyberguard_dir()
            .join("vectorstore")
            .to_string_lossy()
            .into_owned();
        Self { store_path }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        let cache_dir = default_cyberguard_dir()
            .join("models")
            .to_string_lossy()
            .into_owned();
        Self {
            provider: "local".into(),
            model: "all-MiniLM-L6-v2".into(),
            cache_dir,
            batch_size: 32,
            max_seq_len: 256,
        }
    }
}

/// Returns `~/.cyberguard/`
pub fn default_cyberguard_dir() -> PathBuf {
    dirs::home_dir()
        .expect("home directory must exist")
        .join(".cyberguard")
}

/// Returns the default config file path: `~/.cyberguard/config.toml`
pub fn default_config_path() -> PathBuf {
    default_cyberguard_dir().join("config.toml")
}

impl CyberguardConfig {
    /// Load config from the default TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            CyberguardConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (CYBERGUARD_STORE, CYBERGUARD_LOG_LEVEL,
    /// CYBERGUARD_USE_GPU).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("CYBERGUARD_STORE") {
            self.storage.store_path = val;
        }
        if let Ok(val) = std::env::var("CYBERGUARD_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var(crate::gpu::USE_GPU_ENV) {
            self.runtime.use_gpu = Some(val);
        }
    }

    /// Resolve the index directory, expanding `~` if needed.
    pub fn resolved_store_path(&self) -> PathBuf {
        expand_tilde(&self.storage.store_path)
    }

    /// GPU layer count for local model runtimes.
    pub fn gpu_layers(&self) -> i32 {
        crate::gpu::choose_layer_count(self.runtime.use_gpu.as_deref())
    }

    pub fn ingest_options(&self) -> IngestOptions {
        IngestOptions {
            skip_uninformative_rows: self.ingest.skip_uninformative_rows,
        }
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .expect("home directory must exist")
            .join(rest)
    } else {
        PathBuf::from(path)
    }
}
