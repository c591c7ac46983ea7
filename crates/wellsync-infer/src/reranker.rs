//! Rerank backend trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use wellsync_core::{Error, Result};

/// One kept document from a rerank call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RerankHit {
    /// Position of the document in the submitted list.
    pub index: usize,
    pub relevance_score: f64,
}

/// Trait for relevance reranking backends.
#[async_trait]
pub trait RerankBackend: Send + Sync {
    /// Score `documents` against `query` and return at most `top_n` hits,
    /// most relevant first.
    async fn rerank(
        &self,
        query: &str,
        documents: &[String],
        top_n: usize,
    ) -> Result<Vec<RerankHit>>;

    fn model(&self) -> &str;

    fn is_available(&self) -> bool;
}

/// Placeholder reranker used when no provider credentials are configured.
pub struct UnconfiguredReranker;

#[async_trait]
impl RerankBackend for UnconfiguredReranker {
    async fn rerank(
        &self,
        _query: &str,
        _documents: &[String],
        _top_n: usize,
    ) -> Result<Vec<RerankHit>> {
        Err(Error::Config("Cohere API key is not configured".into()))
    }

    fn model(&self) -> &str {
        "unconfigured"
    }

    fn is_available(&self) -> bool {
        false
    }
}
