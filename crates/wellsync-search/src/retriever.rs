//! Similarity retriever: embeds a query and fetches the nearest stored faults.

use std::sync::Arc;

use tracing::debug;
use wellsync_core::{Error, Result, SearchSettings};
use wellsync_infer::{EmbedIntent, EmbeddingBackend};
use wellsync_store::SimilarityQuery;

use crate::ports::SimilarityIndex;
use crate::types::{validate_embedding, SearchCandidate, SearchRequest};

pub struct SimilarityRetriever {
    embedder: Arc<dyn EmbeddingBackend>,
    index: Arc<dyn SimilarityIndex>,
    similarity_threshold: f32,
    match_count: usize,
}

impl SimilarityRetriever {
    pub fn new(
        embedder: Arc<dyn EmbeddingBackend>,
        index: Arc<dyn SimilarityIndex>,
        settings: &SearchSettings,
    ) -> Self {
        Self {
            embedder,
            index,
            similarity_threshold: settings.similarity_threshold,
            match_count: settings.match_count,
        }
    }

    /// Return candidates with similarity >= threshold, most similar first,
    /// capped at `match_count`. Provider or index failures are errors, never
    /// an empty list.
    pub async fn retrieve(&self, request: &SearchRequest) -> Result<Vec<SearchCandidate>> {
        let vectors = self
            .embedder
            .embed(std::slice::from_ref(&request.query), EmbedIntent::Query)
            .await
            .map_err(|e| Error::Inference(format!("Failed to generate query embedding: {}", e)))?;

        let query_embedding = vectors.into_iter().next().ok_or_else(|| {
            Error::Inference("Embedding provider returned no vector for the query".into())
        })?;
        validate_embedding(&query_embedding)?;

        let mut rows = self
            .index
            .search_faults(&SimilarityQuery {
                query_embedding,
                similarity_threshold: self.similarity_threshold,
                match_count: self.match_count,
            })
            .map_err(|e| Error::Search(format!("Failed to search faults: {}", e)))?;
        rows.truncate(self.match_count);

        debug!(
            candidates = rows.len(),
            threshold = self.similarity_threshold,
            "Similarity search complete"
        );

        Ok(rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| SearchCandidate::from_match(i, row))
            .collect())
    }
}
