pub mod assistant;
pub mod emergency;
pub mod facilities;
pub mod records;

use axum::routing::get;
use axum::{Json, Router};

use crate::state::AppState;

pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/facilities", facilities::router())
        .nest("/assistant", assistant::router())
        .nest("/patients", records::router())
        .nest("/emergency", emergency::router())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
