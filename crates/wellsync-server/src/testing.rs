//! Test fixtures: fake providers and a tempdir-backed `AppState`.

use async_trait::async_trait;
use chrono::Utc;
use tempfile::TempDir;
use wellsync_core::{AssetRef, Error, FaultRecord, NewFault, Result, WellSyncConfig};
use wellsync_infer::{Backends, EmbedIntent, EmbeddingBackend, RerankBackend, RerankHit};
use wellsync_store::SqliteStore;

use crate::state::AppState;

pub const DIM: usize = 3;

/// Embedder that maps every text to the same vector, or always fails.
pub struct FakeEmbedder {
    vector: Option<Vec<f32>>,
}

impl FakeEmbedder {
    pub fn unit(dim: usize) -> Self {
        let mut vector = vec![0.0; dim];
        vector[0] = 1.0;
        Self {
            vector: Some(vector),
        }
    }

    pub fn failing() -> Self {
        Self { vector: None }
    }
}

#[async_trait]
impl EmbeddingBackend for FakeEmbedder {
    async fn embed(&self, texts: &[String], _intent: EmbedIntent) -> Result<Vec<Vec<f32>>> {
        match &self.vector {
            Some(v) => Ok(texts.iter().map(|_| v.clone()).collect()),
            None => Err(Error::Inference("Cohere API error 503: unavailable".into())),
        }
    }

    fn model(&self) -> &str {
        "fake-embed"
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// Reranker that reverses the submitted order, or always fails.
pub struct FakeReranker {
    fail: bool,
}

impl FakeReranker {
    pub fn reversing() -> Self {
        Self { fail: false }
    }

    pub fn failing() -> Self {
        Self { fail: true }
    }
}

#[async_trait]
impl RerankBackend for FakeReranker {
    async fn rerank(
        &self,
        _query: &str,
        documents: &[String],
        top_n: usize,
    ) -> Result<Vec<RerankHit>> {
        if self.fail {
            return Err(Error::Inference("Cohere API error 500: boom".into()));
        }
        Ok((0..documents.len())
            .rev()
            .take(top_n)
            .enumerate()
            .map(|(rank, index)| RerankHit {
                index,
                relevance_score: 1.0 - rank as f64 * 0.1,
            })
            .collect())
    }

    fn model(&self) -> &str {
        "fake-rerank"
    }

    fn is_available(&self) -> bool {
        !self.fail
    }
}

pub fn test_state(embedder: FakeEmbedder) -> (TempDir, AppState) {
    test_state_with(embedder, FakeReranker::failing())
}

pub fn test_state_with(embedder: FakeEmbedder, reranker: FakeReranker) -> (TempDir, AppState) {
    let dir = TempDir::new().unwrap();
    let mut config = WellSyncConfig::new(dir.path()).unwrap();
    config.embedding_dim = DIM;
    let store = SqliteStore::open(&config.data_paths.db, DIM).unwrap();
    let backends = Backends {
        embedder: std::sync::Arc::new(embedder),
        reranker: std::sync::Arc::new(reranker),
    };
    (dir, AppState::new(config, store, backends))
}

pub fn insert_fault(state: &AppState, fault_id: &str) -> FaultRecord {
    state
        .store
        .insert_fault(&NewFault {
            fault_id: fault_id.into(),
            asset: AssetRef::well("w1"),
            part_id: "p1".into(),
            fault_type: "Oil Leakage".into(),
            status: "Fault".into(),
            timestamp: Utc::now(),
            description: None,
            part_specifications: None,
        })
        .unwrap()
}

/// Send one request through the full router and decode the JSON response.
pub async fn send(
    state: std::sync::Arc<AppState>,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (axum::http::StatusCode, serde_json::Value) {
    use axum::body::Body;
    use axum::http::{header, Request};
    use tower::ServiceExt;

    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = crate::routes::build_router(state)
        .oneshot(request)
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
