//! Storage seams the search core depends on.

use wellsync_core::Result;
use wellsync_store::{FaultMatchRow, SimilarityQuery, SqliteStore};

/// Write side: persists fault embeddings.
pub trait EmbeddingSink: Send + Sync {
    fn store_embedding(&self, fault_id: &str, embedding: &[f32]) -> Result<()>;
    fn has_embedding(&self, fault_id: &str) -> Result<bool>;
}

/// Read side: nearest-neighbour lookup over stored fault embeddings.
pub trait SimilarityIndex: Send + Sync {
    /// Faults with cosine similarity >= the threshold, most similar first,
    /// at most `match_count` rows.
    fn search_faults(&self, query: &SimilarityQuery) -> Result<Vec<FaultMatchRow>>;
}

impl EmbeddingSink for SqliteStore {
    fn store_embedding(&self, fault_id: &str, embedding: &[f32]) -> Result<()> {
        self.add_fault_embedding(fault_id, embedding)
    }

    fn has_embedding(&self, fault_id: &str) -> Result<bool> {
        self.has_fault_embedding(fault_id)
    }
}

impl SimilarityIndex for SqliteStore {
    fn search_faults(&self, query: &SimilarityQuery) -> Result<Vec<FaultMatchRow>> {
        SqliteStore::search_faults(self, query)
    }
}
