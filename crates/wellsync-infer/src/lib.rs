//! WellSync Infer: embedding and rerank provider backends.
//!
//! Provides the `EmbeddingBackend` and `RerankBackend` traits. When a Cohere
//! API key is configured, `CohereClient` serves both; otherwise the
//! unconfigured placeholders are used and every provider call fails with a
//! configuration error.

pub mod cohere;
pub mod embedder;
pub mod reranker;

pub use cohere::CohereClient;
pub use embedder::{EmbedIntent, EmbeddingBackend, UnconfiguredEmbedder};
pub use reranker::{RerankBackend, RerankHit, UnconfiguredReranker};

use std::sync::Arc;

use wellsync_core::ProviderConfig;

/// Provider handles shared by the generator and the search pipeline.
#[derive(Clone)]
pub struct Backends {
    pub embedder: Arc<dyn EmbeddingBackend>,
    pub reranker: Arc<dyn RerankBackend>,
}

/// Create the best available backends for the given provider configuration.
///
/// Uses Cohere when an API key is present, falls back to the unconfigured placeholders.
pub fn create_backends(config: &ProviderConfig) -> Backends {
    match CohereClient::new(config) {
        Ok(client) => {
            tracing::info!(
                "Using Cohere backends (embed={}, rerank={})",
                client.embed_model(),
                client.rerank_model()
            );
            let client = Arc::new(client);
            Backends {
                embedder: client.clone(),
                reranker: client,
            }
        }
        Err(e) => {
            tracing::warn!("Cohere backends unavailable: {}", e);
            Backends {
                embedder: Arc::new(UnconfiguredEmbedder),
                reranker: Arc::new(UnconfiguredReranker),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_backends_without_key() {
        let backends = create_backends(&ProviderConfig::default());
        assert!(!backends.embedder.is_available());
        assert!(!backends.reranker.is_available());
    }

    #[test]
    fn test_create_backends_with_key() {
        let backends = create_backends(&ProviderConfig {
            api_key: Some("key".into()),
            ..Default::default()
        });
        assert!(backends.embedder.is_available());
        assert_eq!(backends.embedder.model(), "embed-english-v3.0");
        assert_eq!(backends.reranker.model(), "rerank-english-v2.0");
    }
}
