//! HTTP route handlers: fault reporting, asset registry, fault search and the
//! change-feed webhook.

pub mod assets;
pub mod faults;
pub mod functions;
pub mod search;
pub mod stats;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;
use wellsync_core::Error;

use crate::state::AppState;

/// Build the main Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .merge(functions::routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(stats::routes())
        .merge(faults::routes())
        .merge(assets::routes())
        .merge(search::routes())
}

/// Map a domain error to a status code and `{ "error": message }` body.
pub(crate) fn error_response(e: &Error) -> (StatusCode, Json<serde_json::Value>) {
    let status = match e {
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        e if e.is_client_error() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!("Request failed: {}", e);
    }
    (status, Json(serde_json::json!({ "error": e.to_string() })))
}

pub(crate) fn bad_request(message: impl Into<String>) -> (StatusCode, Json<serde_json::Value>) {
    error_response(&Error::InvalidInput(message.into()))
}
