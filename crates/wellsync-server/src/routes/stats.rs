//! Health and stats routes.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(get_health))
        .route("/stats", get(get_stats))
}

/// GET /api/health: liveness plus provider availability.
async fn get_health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "wellsync",
        "faults": state.store.count_faults().unwrap_or(0),
        "embeddings": state.store.count_embeddings().unwrap_or(0),
        "embedderAvailable": state.backends.embedder.is_available(),
        "rerankerAvailable": state.backends.reranker.is_available(),
    }))
}

/// GET /api/stats: storage statistics and change-feed counters.
async fn get_stats(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let store_stats = state.store.get_stats().unwrap_or_else(|e| {
        tracing::warn!("Failed to read store stats: {}", e);
        wellsync_store::StoreStats {
            total_faults: 0,
            embeddings_stored: 0,
            faults_pending_embedding: 0,
            total_assets: 0,
            embedding_dimension: state.config.embedding_dim,
            db_path: String::new(),
            db_size_mb: 0.0,
            matrix_loaded: false,
            matrix_rows: 0,
        }
    });
    let feed = state.feed_stats.snapshot();

    Json(serde_json::json!({
        "faults": store_stats.total_faults,
        "embeddings": store_stats.embeddings_stored,
        "pendingEmbeddings": store_stats.faults_pending_embedding,
        "assets": store_stats.total_assets,
        "embeddingDimension": store_stats.embedding_dimension,
        "dbSizeMb": store_stats.db_size_mb,
        "matrixLoaded": store_stats.matrix_loaded,
        "matrixRows": store_stats.matrix_rows,
        "embedModel": state.backends.embedder.model(),
        "rerankModel": state.backends.reranker.model(),
        "search": state.config.search,
        "changeFeed": feed,
    }))
}
