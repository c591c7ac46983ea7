//! Asset registry routes.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use wellsync_core::{Asset, AssetKind, Error};

use super::{bad_request, error_response};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/assets", post(upsert_asset))
        .route("/assets/{id}", get(get_asset))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertAssetRequest {
    id: String,
    kind: String,
    name: Option<String>,
    status: Option<String>,
    fault_details: Option<serde_json::Value>,
}

/// POST /api/assets: register or update a well or transformer.
async fn upsert_asset(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<UpsertAssetRequest>, JsonRejection>,
) -> impl IntoResponse {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(_) => return bad_request("Invalid request body"),
    };
    if req.id.trim().is_empty() {
        return bad_request("Missing id parameter");
    }
    let kind: AssetKind = match req.kind.parse() {
        Ok(k) => k,
        Err(e) => return error_response(&e),
    };

    let asset = Asset {
        name: req.name.unwrap_or_else(|| req.id.clone()),
        id: req.id,
        kind,
        status: req.status.unwrap_or_else(|| "Operational".to_string()),
        fault_details: req.fault_details,
        updated_at: Utc::now(),
    };
    match state.store.upsert_asset(&asset) {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!(asset))),
        Err(e) => error_response(&e),
    }
}

/// GET /api/assets/{id}
async fn get_asset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.store.get_asset(&id) {
        Ok(Some(asset)) => (StatusCode::OK, Json(serde_json::json!(asset))),
        Ok(None) => error_response(&Error::NotFound(format!("Asset {}", id))),
        Err(e) => error_response(&e),
    }
}
