//! In-memory fakes for provider and storage seams.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use wellsync_core::{Error, Result};
use wellsync_infer::{EmbedIntent, EmbeddingBackend, RerankBackend, RerankHit};
use wellsync_store::{FaultMatchRow, FaultRow, SimilarityQuery};

use crate::ports::{EmbeddingSink, SimilarityIndex};
use crate::types::{ChangeEvent, FAULTS_TABLE, INSERT_EVENT};

pub fn insert_event(record: Value) -> ChangeEvent {
    ChangeEvent {
        kind: INSERT_EVENT.into(),
        table: FAULTS_TABLE.into(),
        schema: Some("public".into()),
        record: Some(record),
        old_record: None,
    }
}

pub fn fault_row(fault_id: &str) -> FaultRow {
    FaultRow {
        fault_id: fault_id.into(),
        well_id: Some("w1".into()),
        transformer_id: None,
        part_id: "p1".into(),
        fault_type: "Oil Leakage".into(),
        status: "Fault".into(),
        timestamp: "2024-03-01T10:15:00Z".into(),
        description: None,
        part_specifications_json: None,
    }
}

/// Embedder returning a scripted batch for every call and recording inputs.
pub struct FakeEmbedder {
    response: Option<Vec<Vec<f32>>>,
    calls: Mutex<Vec<(Vec<String>, EmbedIntent)>>,
}

impl FakeEmbedder {
    pub fn returning(vector: Vec<f32>) -> Self {
        Self::with_batch(vec![vector])
    }

    pub fn with_batch(batch: Vec<Vec<f32>>) -> Self {
        Self {
            response: Some(batch),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            response: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(Vec<String>, EmbedIntent)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl EmbeddingBackend for FakeEmbedder {
    async fn embed(&self, texts: &[String], intent: EmbedIntent) -> Result<Vec<Vec<f32>>> {
        self.calls.lock().push((texts.to_vec(), intent));
        self.response
            .clone()
            .ok_or_else(|| Error::Inference("Cohere API error 503: unavailable".into()))
    }

    fn model(&self) -> &str {
        "fake-embed"
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// Embedder that holds every call at a barrier until `parties` calls are in flight.
pub struct GatedEmbedder {
    gate: tokio::sync::Barrier,
    vector: Vec<f32>,
}

impl GatedEmbedder {
    pub fn new(parties: usize, vector: Vec<f32>) -> Self {
        Self {
            gate: tokio::sync::Barrier::new(parties),
            vector,
        }
    }
}

#[async_trait]
impl EmbeddingBackend for GatedEmbedder {
    async fn embed(&self, _texts: &[String], _intent: EmbedIntent) -> Result<Vec<Vec<f32>>> {
        self.gate.wait().await;
        Ok(vec![self.vector.clone()])
    }

    fn model(&self) -> &str {
        "gated-embed"
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// Reranker returning scripted hits and recording the documents it saw.
pub struct FakeReranker {
    hits: Option<Vec<RerankHit>>,
    calls: Mutex<Vec<(String, Vec<String>, usize)>>,
}

impl FakeReranker {
    pub fn returning(hits: &[(usize, f64)]) -> Self {
        Self {
            hits: Some(
                hits.iter()
                    .map(|&(index, relevance_score)| RerankHit { index, relevance_score })
                    .collect(),
            ),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            hits: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, Vec<String>, usize)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl RerankBackend for FakeReranker {
    async fn rerank(
        &self,
        query: &str,
        documents: &[String],
        top_n: usize,
    ) -> Result<Vec<RerankHit>> {
        self.calls
            .lock()
            .push((query.to_string(), documents.to_vec(), top_n));
        self.hits
            .clone()
            .ok_or_else(|| Error::Inference("Cohere API error 500: boom".into()))
    }

    fn model(&self) -> &str {
        "fake-rerank"
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// Sink keeping embeddings in a map, write-once like the real store.
#[derive(Default)]
pub struct MemorySink {
    stored: Mutex<HashMap<String, Vec<f32>>>,
    reject: bool,
}

impl MemorySink {
    pub fn rejecting() -> Self {
        Self {
            stored: Mutex::new(HashMap::new()),
            reject: true,
        }
    }

    pub fn get(&self, fault_id: &str) -> Option<Vec<f32>> {
        self.stored.lock().get(fault_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.stored.lock().len()
    }
}

impl EmbeddingSink for MemorySink {
    fn store_embedding(&self, fault_id: &str, embedding: &[f32]) -> Result<()> {
        if self.reject {
            return Err(Error::Storage("disk full".into()));
        }
        let mut stored = self.stored.lock();
        if stored.contains_key(fault_id) {
            return Err(Error::DuplicateEmbedding(fault_id.into()));
        }
        stored.insert(fault_id.to_string(), embedding.to_vec());
        Ok(())
    }

    fn has_embedding(&self, fault_id: &str) -> Result<bool> {
        Ok(self.stored.lock().contains_key(fault_id))
    }
}

/// Index with fixed per-fault similarities. Applies threshold and cap like the store.
pub struct FixedIndex {
    scored: Vec<(String, f32)>,
    queries: Mutex<Vec<SimilarityQuery>>,
    fail: bool,
}

impl FixedIndex {
    pub fn new(scored: &[(&str, f32)]) -> Self {
        Self {
            scored: scored.iter().map(|&(id, s)| (id.to_string(), s)).collect(),
            queries: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            scored: Vec::new(),
            queries: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn queries(&self) -> Vec<SimilarityQuery> {
        self.queries.lock().clone()
    }
}

impl SimilarityIndex for FixedIndex {
    fn search_faults(&self, query: &SimilarityQuery) -> Result<Vec<FaultMatchRow>> {
        self.queries.lock().push(query.clone());
        if self.fail {
            return Err(Error::Database("database is locked".into()));
        }
        let mut rows: Vec<FaultMatchRow> = self
            .scored
            .iter()
            .filter(|(_, s)| *s >= query.similarity_threshold)
            .map(|(id, s)| FaultMatchRow {
                fault: fault_row(id),
                similarity: *s,
            })
            .collect();
        rows.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        rows.truncate(query.match_count);
        Ok(rows)
    }
}

