//! Relevance reranker: rescores candidates against the query text.
//!
//! Reranking is best-effort. Any provider failure degrades to the retriever's
//! similarity ordering instead of failing the search.

use std::sync::Arc;

use tracing::{debug, warn};
use wellsync_core::{Error, Result};
use wellsync_infer::{RerankBackend, RerankHit};

use crate::types::{RankedResult, SearchCandidate, SearchOutcome};

const NOT_AVAILABLE: &str = "N/A";
const UNKNOWN_TIME: &str = "Unknown time";

/// Text the reranker scores for one candidate.
pub fn candidate_summary(candidate: &SearchCandidate) -> String {
    let fault = &candidate.fault;
    let timestamp = fault
        .timestamp
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| UNKNOWN_TIME.to_string());
    let asset_id = fault
        .well_id
        .as_deref()
        .or(fault.transformer_id.as_deref())
        .unwrap_or(NOT_AVAILABLE);

    format!(
        "Fault Type: {}, Timestamp: {}, Part ID: {}, Asset ID: {}",
        non_empty_or_na(&fault.fault_type),
        timestamp,
        non_empty_or_na(&fault.part_id),
        asset_id
    )
}

fn non_empty_or_na(value: &str) -> &str {
    if value.is_empty() {
        NOT_AVAILABLE
    } else {
        value
    }
}

pub struct RelevanceReranker {
    backend: Arc<dyn RerankBackend>,
    top_n: usize,
}

impl RelevanceReranker {
    pub fn new(backend: Arc<dyn RerankBackend>, top_n: usize) -> Self {
        Self { backend, top_n }
    }

    /// Rerank `candidates` for `query`.
    ///
    /// No candidates means no provider call. On provider failure the
    /// candidates come back unchanged, without scores.
    pub async fn rerank(&self, query: &str, candidates: Vec<SearchCandidate>) -> SearchOutcome {
        if candidates.is_empty() {
            return SearchOutcome::empty();
        }

        let documents: Vec<String> = candidates.iter().map(candidate_summary).collect();
        let ranked = match self.backend.rerank(query, &documents, self.top_n).await {
            Ok(hits) => attach_scores(&candidates, hits, self.top_n),
            Err(e) => Err(e),
        };

        match ranked {
            Ok(ranked) => {
                debug!(kept = ranked.len(), submitted = candidates.len(), "Rerank complete");
                SearchOutcome::Reranked(ranked)
            }
            Err(e) => {
                warn!("Rerank failed, returning similarity order: {}", e);
                SearchOutcome::Unranked(candidates)
            }
        }
    }
}

/// Map provider hits back onto the submitted candidates, keeping provider order.
fn attach_scores(
    candidates: &[SearchCandidate],
    hits: Vec<RerankHit>,
    top_n: usize,
) -> Result<Vec<RankedResult>> {
    hits.into_iter()
        .take(top_n)
        .map(|hit| {
            let candidate = candidates.get(hit.index).ok_or_else(|| {
                Error::Inference(format!(
                    "Rerank result index {} out of range ({} documents)",
                    hit.index,
                    candidates.len()
                ))
            })?;
            Ok(RankedResult {
                candidate: candidate.clone(),
                rerank_score: hit.relevance_score,
            })
        })
        .collect()
}
