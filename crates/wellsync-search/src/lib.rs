//! WellSync Search: the fault search core.
//!
//! Three stages share the provider and storage seams:
//! - `EmbeddingGenerator` reacts to fault insert events and stores one embedding per fault.
//! - `SimilarityRetriever` embeds a query and returns the nearest faults above a threshold.
//! - `RelevanceReranker` rescores those candidates, falling back to similarity order on failure.
//!
//! `FaultSearch` chains retrieval and reranking.

pub mod generator;
pub mod pipeline;
pub mod ports;
pub mod rerank;
pub mod retriever;
pub mod types;

#[cfg(test)]
mod testing;

pub use generator::{canonical_text, EmbeddingGenerator};
pub use pipeline::FaultSearch;
pub use ports::{EmbeddingSink, SimilarityIndex};
pub use rerank::{candidate_summary, RelevanceReranker};
pub use retriever::SimilarityRetriever;
pub use types::*;
