//! Fault search route.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use tracing::debug;
use wellsync_search::{SearchRequest, SearchRequestBody};

use super::{bad_request, error_response};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/search_faults", post(search_faults))
}

/// POST /api/search_faults: semantic search over fault history.
///
/// Returns a JSON array: reranked results with `rerank_score`, or the
/// similarity-ordered candidates when reranking is unavailable.
async fn search_faults(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SearchRequestBody>, JsonRejection>,
) -> impl IntoResponse {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(e) => {
            debug!("Rejected search body: {}", e);
            return bad_request("Invalid request body").into_response();
        }
    };
    let request = match SearchRequest::try_from(body) {
        Ok(r) => r,
        Err(e) => return error_response(&e).into_response(),
    };

    match state.search.search(&request).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(e) => error_response(&e).into_response(),
    }
}
