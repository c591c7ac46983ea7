//! Search core types: change events, search requests, candidates and ranked results.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use wellsync_core::{Error, FaultRecord, Result};
use wellsync_store::FaultMatchRow;

/// Source table whose inserts trigger embedding generation.
pub const FAULTS_TABLE: &str = "faults";
/// Operation tag of an insert event.
pub const INSERT_EVENT: &str = "INSERT";

/// A database change-feed notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Operation tag: `INSERT`, `UPDATE` or `DELETE`.
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub table: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default)]
    pub record: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_record: Option<Value>,
}

impl ChangeEvent {
    /// Insert event for a fault that was just stored.
    pub fn fault_insert(fault: &FaultRecord) -> Result<Self> {
        Ok(Self {
            kind: INSERT_EVENT.into(),
            table: FAULTS_TABLE.into(),
            schema: Some("public".into()),
            record: Some(serde_json::to_value(fault)?),
            old_record: None,
        })
    }

    pub fn is_fault_insert(&self) -> bool {
        self.kind == INSERT_EVENT && self.table == FAULTS_TABLE
    }
}

/// The fields of an inserted fault row the generator reads.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertedFault {
    pub fault_id: String,
    pub fault_type: Option<String>,
    pub status: Option<String>,
}

impl InsertedFault {
    /// Extract the inserted row from an event. Fails if `fault_id` is missing or empty.
    pub fn from_event(event: &ChangeEvent) -> Result<Self> {
        let record = event.record.as_ref().filter(|r| r.is_object());
        let fault_id = record
            .and_then(|r| r.get("fault_id"))
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                Error::InvalidEvent("Invalid fault record received (missing fault_id)".into())
            })?;

        let text_field = |name: &str| {
            record
                .and_then(|r| r.get(name))
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        Ok(Self {
            fault_id: fault_id.to_string(),
            fault_type: text_field("fault_type"),
            status: text_field("status"),
        })
    }
}

/// Result of one generator invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratorOutcome {
    /// The event was not a fault insert; nothing happened.
    Skipped,
    /// A new embedding was stored.
    Embedded { fault_id: String, dimension: usize },
    /// The fault already had its embedding (redelivered event); nothing was written.
    AlreadyEmbedded { fault_id: String },
}

impl GeneratorOutcome {
    pub fn fault_id(&self) -> Option<&str> {
        match self {
            Self::Skipped => None,
            Self::Embedded { fault_id, .. } | Self::AlreadyEmbedded { fault_id } => Some(fault_id),
        }
    }
}

/// Raw search request body as sent by the dashboard.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRequestBody {
    #[serde(default)]
    pub query: Option<Value>,
    #[serde(default, rename = "scopeId", alias = "wellId")]
    pub scope_id: Option<Value>,
}

/// A validated fault search request.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    /// Asset scope the search was issued from. Logged, not used for filtering.
    pub scope_id: String,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, scope_id: impl Into<String>) -> Result<Self> {
        let query = query.into();
        let scope_id = scope_id.into();
        if query.is_empty() {
            return Err(Error::InvalidInput("Missing or invalid query parameter".into()));
        }
        if scope_id.is_empty() {
            return Err(Error::InvalidInput("Missing or invalid scopeId parameter".into()));
        }
        Ok(Self { query, scope_id })
    }
}

impl TryFrom<SearchRequestBody> for SearchRequest {
    type Error = Error;

    fn try_from(body: SearchRequestBody) -> Result<Self> {
        let query = match body.query {
            Some(Value::String(q)) => q,
            _ => return Err(Error::InvalidInput("Missing or invalid query parameter".into())),
        };
        let scope_id = match body.scope_id {
            Some(Value::String(s)) => s,
            _ => return Err(Error::InvalidInput("Missing or invalid scopeId parameter".into())),
        };
        Self::new(query, scope_id)
    }
}

/// A similarity-search hit awaiting reranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchCandidate {
    /// Position in the retriever's output, used to correlate rerank results.
    #[serde(skip)]
    pub index: usize,
    #[serde(flatten)]
    pub fault: FaultRecord,
    pub similarity: f32,
}

impl SearchCandidate {
    /// Map a storage match row to the domain candidate at position `index`.
    pub fn from_match(index: usize, row: FaultMatchRow) -> Self {
        Self {
            index,
            similarity: row.similarity,
            fault: row.fault.into(),
        }
    }
}

/// A candidate with the reranker's relevance score attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResult {
    #[serde(flatten)]
    pub candidate: SearchCandidate,
    pub rerank_score: f64,
}

/// Final result of a fault search. Serializes as a plain JSON array either way.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SearchOutcome {
    /// Reranked results in provider order.
    Reranked(Vec<RankedResult>),
    /// Retriever output in similarity order (no candidates, or rerank unavailable).
    Unranked(Vec<SearchCandidate>),
}

impl SearchOutcome {
    pub fn empty() -> Self {
        Self::Unranked(Vec::new())
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Reranked(r) => r.len(),
            Self::Unranked(c) => c.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_reranked(&self) -> bool {
        matches!(self, Self::Reranked(_))
    }

    /// Fault ids in output order.
    pub fn fault_ids(&self) -> Vec<&str> {
        match self {
            Self::Reranked(r) => r.iter().map(|r| r.candidate.fault.fault_id.as_str()).collect(),
            Self::Unranked(c) => c.iter().map(|c| c.fault.fault_id.as_str()).collect(),
        }
    }
}

/// Check that a provider vector is usable: non-empty and finite.
pub(crate) fn validate_embedding(embedding: &[f32]) -> Result<()> {
    if embedding.is_empty() {
        return Err(Error::Inference("Embedding provider returned an empty vector".into()));
    }
    if embedding.iter().any(|v| !v.is_finite()) {
        return Err(Error::Inference(
            "Embedding provider returned non-finite values".into(),
        ));
    }
    Ok(())
}
