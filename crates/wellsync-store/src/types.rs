//! Row types for faults, embeddings and similarity matches.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wellsync_core::FaultRecord;

/// A faults-table row exactly as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaultRow {
    pub fault_id: String,
    pub well_id: Option<String>,
    pub transformer_id: Option<String>,
    pub part_id: String,
    pub fault_type: String,
    pub status: String,
    /// RFC 3339 text.
    pub timestamp: String,
    pub description: Option<String>,
    pub part_specifications_json: Option<String>,
}

impl From<FaultRow> for FaultRecord {
    fn from(row: FaultRow) -> Self {
        let timestamp = DateTime::parse_from_rfc3339(&row.timestamp)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| {
                tracing::warn!(
                    "Unparseable timestamp {:?} on fault {}: {}",
                    row.timestamp,
                    row.fault_id,
                    e
                )
            })
            .ok();
        let part_specifications = row
            .part_specifications_json
            .as_deref()
            .and_then(|s| serde_json::from_str(s).ok());

        FaultRecord {
            fault_id: row.fault_id,
            well_id: row.well_id,
            transformer_id: row.transformer_id,
            part_id: row.part_id,
            fault_type: row.fault_type,
            status: row.status,
            timestamp,
            description: row.description,
            part_specifications,
        }
    }
}

/// One row of the similarity search: the fault plus its cosine similarity to the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaultMatchRow {
    #[serde(flatten)]
    pub fault: FaultRow,
    pub similarity: f32,
}

/// Parameters of the similarity search call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityQuery {
    pub query_embedding: Vec<f32>,
    pub similarity_threshold: f32,
    pub match_count: usize,
}

/// Filters for listing fault history.
#[derive(Debug, Clone, Default)]
pub struct FaultFilter {
    pub well_id: Option<String>,
    pub transformer_id: Option<String>,
    pub limit: Option<usize>,
}

/// Store-level statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreStats {
    pub total_faults: i64,
    pub embeddings_stored: i64,
    pub faults_pending_embedding: i64,
    pub total_assets: i64,
    pub embedding_dimension: usize,
    pub db_path: String,
    pub db_size_mb: f64,
    pub matrix_loaded: bool,
    pub matrix_rows: usize,
}
