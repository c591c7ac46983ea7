//! Embedding backend trait and the unconfigured fallback.
//!
//! The `EmbeddingBackend` trait abstracts over embedding generation.
//! Implementations:
//! - `CohereClient`: Cohere `/v1/embed` over HTTP
//! - `UnconfiguredEmbedder`: returned when no API key is set; every call fails

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use wellsync_core::{Error, Result};

/// What the embedded text is used for.
///
/// Stored fault descriptions and search queries may live in different regions
/// of the model's vector space, so the two must never be mixed up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmbedIntent {
    /// Text that will be stored and searched against.
    #[serde(rename = "search_document")]
    Document,
    /// Free-text query searched against stored documents.
    #[serde(rename = "search_query")]
    Query,
}

impl EmbedIntent {
    /// Wire value for the provider's `input_type` field.
    pub fn as_input_type(&self) -> &'static str {
        match self {
            Self::Document => "search_document",
            Self::Query => "search_query",
        }
    }
}

impl std::fmt::Display for EmbedIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_input_type())
    }
}

/// Trait for embedding backends.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Embed a batch of texts. One vector per text is expected but callers
    /// must verify the count; the backend returns what the provider sent.
    async fn embed(&self, texts: &[String], intent: EmbedIntent) -> Result<Vec<Vec<f32>>>;

    /// Model identifier used for logging.
    fn model(&self) -> &str;

    /// Check if the backend can serve requests.
    fn is_available(&self) -> bool;
}

/// Placeholder embedder used when no provider credentials are configured.
pub struct UnconfiguredEmbedder;

#[async_trait]
impl EmbeddingBackend for UnconfiguredEmbedder {
    async fn embed(&self, _texts: &[String], _intent: EmbedIntent) -> Result<Vec<Vec<f32>>> {
        Err(Error::Config("Cohere API key is not configured".into()))
    }

    fn model(&self) -> &str {
        "unconfigured"
    }

    fn is_available(&self) -> bool {
        false
    }
}
