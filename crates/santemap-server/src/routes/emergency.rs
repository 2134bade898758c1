//! Emergency intake: accept a request form, optionally pre-targeted at
//! a facility, and list received requests for dispatch.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use santemap_schema::{Coordinate, EmergencyRequest};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EmergencyPayload {
    pub full_name: String,
    pub phone: String,
    pub description: String,
    #[serde(default)]
    pub location: Option<Coordinate>,
    #[serde(default)]
    pub facility_id: Option<u32>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_requests).post(create_request))
}

async fn create_request(
    State(state): State<AppState>,
    Json(payload): Json<EmergencyPayload>,
) -> Result<(StatusCode, Json<EmergencyRequest>), StatusCode> {
    // A request aimed at an unknown facility is a client error, not a
    // row to store.
    if let Some(facility_id) = payload.facility_id {
        if state.catalog.get(facility_id).is_none() {
            return Err(StatusCode::UNPROCESSABLE_ENTITY);
        }
    }

    let request = EmergencyRequest {
        id: Uuid::new_v4(),
        full_name: payload.full_name,
        phone: payload.phone,
        description: payload.description,
        location: payload.location,
        facility_id: payload.facility_id,
        created_at: Utc::now(),
    };
    state
        .store
        .insert_emergency_request(request.clone())
        .await
        .map_err(|err| {
            tracing::error!("emergency intake failure: {err:#}");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
    tracing::info!(id = %request.id, "emergency request received");
    Ok((StatusCode::CREATED, Json(request)))
}

async fn list_requests(
    State(state): State<AppState>,
) -> Result<Json<Vec<EmergencyRequest>>, StatusCode> {
    state.store.list_emergency_requests().await.map(Json).map_err(|err| {
        tracing::error!("emergency list failure: {err:#}");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}
