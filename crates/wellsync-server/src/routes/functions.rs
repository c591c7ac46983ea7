//! Change-feed webhook: lets an external database trigger embedding generation.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use wellsync_core::Error;
use wellsync_search::{ChangeEvent, GeneratorOutcome};

use super::error_response;
use crate::changefeed;
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/functions/generate-fault-embedding",
        post(generate_fault_embedding),
    )
}

/// POST /functions/generate-fault-embedding: run the generator inline for one event.
async fn generate_fault_embedding(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChangeEvent>, JsonRejection>,
) -> impl IntoResponse {
    let event = match payload {
        Ok(Json(event)) => event,
        Err(e) => {
            return error_response(&Error::InvalidEvent(format!(
                "Invalid change event payload: {}",
                e.body_text()
            )))
        }
    };

    match changefeed::dispatch(&state, &event).await {
        Ok(GeneratorOutcome::Skipped) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": "Not a fault insert event" })),
        ),
        Ok(outcome) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "faultId": outcome.fault_id(),
            })),
        ),
        Err(e) => error_response(&e),
    }
}
