//! Fault search pipeline: retrieve by similarity, then rerank.

use std::sync::Arc;

use tracing::info;
use wellsync_core::{Result, SearchSettings};
use wellsync_infer::Backends;

use crate::ports::SimilarityIndex;
use crate::rerank::RelevanceReranker;
use crate::retriever::SimilarityRetriever;
use crate::types::{SearchOutcome, SearchRequest};

pub struct FaultSearch {
    retriever: SimilarityRetriever,
    reranker: RelevanceReranker,
}

impl FaultSearch {
    pub fn new(
        backends: &Backends,
        index: Arc<dyn SimilarityIndex>,
        settings: &SearchSettings,
    ) -> Self {
        Self {
            retriever: SimilarityRetriever::new(backends.embedder.clone(), index, settings),
            reranker: RelevanceReranker::new(backends.reranker.clone(), settings.rerank_top_n),
        }
    }

    pub async fn search(&self, request: &SearchRequest) -> Result<SearchOutcome> {
        info!(query = %request.query, scope_id = %request.scope_id, "Fault search");

        let candidates = self.retriever.retrieve(request).await?;
        let retrieved = candidates.len();
        let outcome = self.reranker.rerank(&request.query, candidates).await;

        info!(
            retrieved,
            returned = outcome.len(),
            reranked = outcome.is_reranked(),
            "Fault search complete"
        );
        Ok(outcome)
    }
}
