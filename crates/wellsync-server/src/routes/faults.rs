//! Fault reporting and fault-history routes.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info, warn};
use wellsync_core::{AssetRef, Error, NewFault};
use wellsync_search::ChangeEvent;
use wellsync_store::FaultFilter;

use super::{bad_request, error_response};
use crate::state::AppState;

const DEFAULT_FAULT_STATUS: &str = "Fault";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/faults", get(list_faults).post(create_fault))
        .route("/faults/{id}", get(get_fault))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateFaultRequest {
    well_id: Option<String>,
    transformer_id: Option<String>,
    part_id: Option<String>,
    fault_type: Option<String>,
    description: Option<String>,
    status: Option<String>,
    part_specifications: Option<serde_json::Value>,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl CreateFaultRequest {
    fn into_new_fault(self) -> wellsync_core::Result<NewFault> {
        let asset = match (present(self.well_id), present(self.transformer_id)) {
            (Some(id), None) => AssetRef::well(id),
            (None, Some(id)) => AssetRef::transformer(id),
            (Some(_), Some(_)) => {
                return Err(Error::InvalidInput(
                    "Provide either wellId or transformerId, not both".into(),
                ))
            }
            (None, None) => {
                return Err(Error::InvalidInput(
                    "Missing wellId or transformerId parameter".into(),
                ))
            }
        };
        let part_id = present(self.part_id)
            .ok_or_else(|| Error::InvalidInput("Missing partId parameter".into()))?;
        let fault_type = present(self.fault_type)
            .ok_or_else(|| Error::InvalidInput("Missing faultType parameter".into()))?;
        let description = present(self.description)
            .unwrap_or_else(|| format!("{} fault detected", fault_type));

        Ok(NewFault {
            fault_id: uuid::Uuid::new_v4().to_string(),
            asset,
            part_id,
            fault_type,
            status: present(self.status).unwrap_or_else(|| DEFAULT_FAULT_STATUS.to_string()),
            timestamp: Utc::now(),
            description: Some(description),
            part_specifications: self.part_specifications,
        })
    }
}

/// POST /api/faults: record a fault, flag its asset and publish the insert event.
async fn create_fault(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateFaultRequest>, JsonRejection>,
) -> impl IntoResponse {
    let new_fault = match payload {
        Ok(Json(req)) => match req.into_new_fault() {
            Ok(f) => f,
            Err(e) => return error_response(&e),
        },
        Err(_) => return bad_request("Invalid request body"),
    };

    let fault = match state.store.insert_fault(&new_fault) {
        Ok(f) => f,
        Err(e) => return error_response(&e),
    };
    info!(
        fault_id = %fault.fault_id,
        asset = %new_fault.asset.id,
        fault_type = %fault.fault_type,
        "Fault recorded"
    );

    let details = serde_json::json!({
        "part_id": fault.part_id,
        "fault_type": fault.fault_type,
        "description": fault.description,
    });
    match state.store.mark_asset_faulted(&new_fault.asset, &details) {
        Ok(true) => {}
        Ok(false) => debug!("Asset {} is not registered", new_fault.asset.id),
        Err(e) => warn!("Failed to update asset {}: {}", new_fault.asset.id, e),
    }

    match ChangeEvent::fault_insert(&fault) {
        Ok(event) => state.publish(event),
        Err(e) => warn!("Failed to build change event for {}: {}", fault.fault_id, e),
    }

    (StatusCode::OK, Json(serde_json::json!(fault)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListFaultsQuery {
    well_id: Option<String>,
    transformer_id: Option<String>,
    limit: Option<usize>,
}

/// GET /api/faults: fault history, newest first.
async fn list_faults(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListFaultsQuery>,
) -> impl IntoResponse {
    let filter = FaultFilter {
        well_id: params.well_id,
        transformer_id: params.transformer_id,
        limit: params.limit,
    };
    match state.store.list_faults(&filter) {
        Ok(faults) => (StatusCode::OK, Json(serde_json::json!(faults))),
        Err(e) => error_response(&e),
    }
}

/// GET /api/faults/{id}
async fn get_fault(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.store.get_fault(&id) {
        Ok(Some(fault)) => (StatusCode::OK, Json(serde_json::json!(fault))),
        Ok(None) => error_response(&Error::NotFound(format!("Fault {}", id))),
        Err(e) => error_response(&e),
    }
}
