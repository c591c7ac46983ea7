//! Configuration and data directory management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_COHERE_BASE_URL: &str = "https://api.cohere.ai";
pub const DEFAULT_EMBED_MODEL: &str = "embed-english-v3.0";
pub const DEFAULT_RERANK_MODEL: &str = "rerank-english-v2.0";
/// Output dimension of `embed-english-v3.0`.
pub const DEFAULT_EMBEDDING_DIM: usize = 1024;

pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.5;
pub const DEFAULT_MATCH_COUNT: usize = 30;
pub const DEFAULT_RERANK_TOP_N: usize = 5;

/// Paths to all WellSync data directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// SQLite database directory (`data/db/`).
    pub db: PathBuf,
}

impl DataPaths {
    /// Create data paths from a root directory. Creates directories if needed.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        let paths = Self {
            db: root.join("db"),
            root,
        };
        std::fs::create_dir_all(&paths.db)?;
        Ok(paths)
    }
}

/// Connection settings for the Cohere embed and rerank endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Not serialized so the key never leaks into logs or debug endpoints.
    #[serde(skip)]
    pub api_key: Option<String>,
    pub base_url: String,
    pub embed_model: String,
    pub rerank_model: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_COHERE_BASE_URL.into(),
            embed_model: DEFAULT_EMBED_MODEL.into(),
            rerank_model: DEFAULT_RERANK_MODEL.into(),
        }
    }
}

/// Tuning knobs for the two-stage fault search.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SearchSettings {
    /// Minimum cosine similarity kept by the retriever.
    pub similarity_threshold: f32,
    /// Maximum number of candidates handed to the reranker.
    pub match_count: usize,
    /// Number of results kept after reranking.
    pub rerank_top_n: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            match_count: DEFAULT_MATCH_COUNT,
            rerank_top_n: DEFAULT_RERANK_TOP_N,
        }
    }
}

/// Top-level WellSync configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WellSyncConfig {
    /// HTTP server port.
    pub port: u16,
    /// Data directory paths.
    pub data_paths: DataPaths,
    /// Embedding dimension stored in the fault embedding table.
    pub embedding_dim: usize,
    pub provider: ProviderConfig,
    pub search: SearchSettings,
}

impl WellSyncConfig {
    /// Configuration with built-in defaults only.
    pub fn new(data_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        Ok(Self {
            port: DEFAULT_PORT,
            data_paths: DataPaths::new(data_dir)?,
            embedding_dim: DEFAULT_EMBEDDING_DIM,
            provider: ProviderConfig::default(),
            search: SearchSettings::default(),
        })
    }

    /// Create configuration from environment and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let mut config = Self::new(data_dir)?;

        config.port = env_or("PORT", config.port);
        config.embedding_dim = env_or("EMBEDDING_DIM", config.embedding_dim);

        config.provider.api_key = std::env::var("COHERE_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());
        if let Ok(url) = std::env::var("COHERE_BASE_URL") {
            config.provider.base_url = url;
        }
        if let Ok(model) = std::env::var("COHERE_EMBED_MODEL") {
            config.provider.embed_model = model;
        }
        if let Ok(model) = std::env::var("COHERE_RERANK_MODEL") {
            config.provider.rerank_model = model;
        }

        config.search.similarity_threshold =
            env_or("SEARCH_SIMILARITY_THRESHOLD", config.search.similarity_threshold);
        config.search.match_count = env_or("SEARCH_MATCH_COUNT", config.search.match_count);
        config.search.rerank_top_n = env_or("SEARCH_RERANK_TOP_N", config.search.rerank_top_n);

        if config.provider.api_key.is_none() {
            tracing::warn!("COHERE_API_KEY not set; embedding and rerank calls will fail");
        }

        Ok(config)
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
