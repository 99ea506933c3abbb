use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use super::error::ApiError;
use super::AppState;
use crate::host::{Attributes, EntityState};

#[derive(Debug, Deserialize)]
pub struct StateUpdate {
    pub state: String,
    #[serde(default)]
    pub attributes: Attributes,
}

/// GET /api/v1/states
pub async fn list_states(State(state): State<AppState>) -> Json<Vec<EntityState>> {
    Json(state.store.all())
}

/// GET /api/v1/states/:entity_id
pub async fn get_state(
    State(state): State<AppState>,
    Path(entity_id): Path<String>,
) -> Result<Json<EntityState>, ApiError> {
    state
        .store
        .get(&entity_id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("entity {}", entity_id)))
}

/// PUT /api/v1/states/:entity_id
///
/// Feeds sensor, weather and sun inputs into the store.
pub async fn put_state(
    State(state): State<AppState>,
    Path(entity_id): Path<String>,
    Json(body): Json<StateUpdate>,
) -> Result<Json<EntityState>, ApiError> {
    if !entity_id.contains('.') {
        return Err(ApiError::BadRequest(format!(
            "entity id {:?} must look like <domain>.<object_id>",
            entity_id
        )));
    }

    let changed = state.store.set(entity_id.as_str(), body.state, body.attributes);
    tracing::debug!(%entity_id, changed, "state written");

    state
        .store
        .get(&entity_id)
        .map(Json)
        .ok_or_else(|| {
            ApiError::InternalError(format!("entity {} vanished after write", entity_id))
        })
}
