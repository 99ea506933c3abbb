use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use super::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    timestamp: chrono::DateTime<chrono::Utc>,
    rooms: usize,
    entities: usize,
    controls: usize,
}

/// GET /healthz
pub async fn healthz(State(state): State<AppState>) -> impl IntoResponse {
    let response = HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now(),
        rooms: state.cfg.rooms.len(),
        entities: state.store.all().len(),
        controls: state.registry.len(),
    };
    (StatusCode::OK, Json(response))
}
