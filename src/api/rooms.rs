use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::IntoEnumIterator;

use super::error::ApiError;
use super::AppState;
use crate::controls::{
    profile_select_unique_id, select_profile, set_number, ControlError, NumberControl,
    PROFILE_SELECT_SUFFIX,
};
use crate::domain::{Orientation, RoomConfig, RoomProfile};
use crate::host::{Attributes, EntityState, Platform};

/// Published value of one output entity
#[derive(Debug, Serialize)]
pub struct OutputStatus {
    /// None while the output is suspended or not published yet
    pub value: Option<f64>,
    pub last_changed: Option<chrono::DateTime<chrono::Utc>>,
    pub diagnostics: Attributes,
}

impl OutputStatus {
    fn from_state(state: Option<EntityState>) -> Self {
        match state {
            Some(s) => Self {
                value: s.numeric_state(),
                last_changed: Some(s.last_changed),
                diagnostics: s.attributes,
            },
            None => Self {
                value: None,
                last_changed: None,
                diagnostics: Attributes::new(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RoomStatus {
    pub id: String,
    pub name: String,
    pub profile: RoomProfile,
    /// Current value of the profile select control
    pub active_profile: Option<String>,
    pub orientation: Orientation,
    /// Current override values, by control name
    pub controls: BTreeMap<String, Option<f64>>,
    pub mrt: OutputStatus,
    pub operative_temperature: OutputStatus,
}

/// Body of a control write: `value` for numbers, `option` for the profile select
#[derive(Debug, Deserialize)]
pub struct ControlUpdate {
    pub value: Option<f64>,
    pub option: Option<String>,
}

fn find_room<'a>(state: &'a AppState, id: &str) -> Result<&'a RoomConfig, ApiError> {
    state
        .cfg
        .room(id)
        .ok_or_else(|| ApiError::NotFound(format!("room {}", id)))
}

fn room_status(state: &AppState, room: &RoomConfig) -> RoomStatus {
    let controls = NumberControl::iter()
        .map(|control| {
            let value = state
                .registry
                .entity_id(Platform::Number, &control.unique_id(room))
                .and_then(|id| state.store.get(&id))
                .and_then(|s| s.numeric_state());
            (control.to_string(), value)
        })
        .collect();

    let active_profile = state
        .registry
        .entity_id(Platform::Select, &profile_select_unique_id(room))
        .and_then(|id| state.store.get(&id))
        .map(|s| s.state);

    RoomStatus {
        id: room.id.clone(),
        name: room.name.clone(),
        profile: room.profile,
        active_profile,
        orientation: room.orientation,
        controls,
        mrt: OutputStatus::from_state(state.store.get(&room.mrt_entity_id())),
        operative_temperature: OutputStatus::from_state(
            state.store.get(&room.operative_entity_id()),
        ),
    }
}

/// GET /api/v1/rooms
pub async fn list_rooms(State(state): State<AppState>) -> Json<Vec<RoomStatus>> {
    let rooms = state
        .cfg
        .rooms
        .iter()
        .map(|room| room_status(&state, room))
        .collect();
    Json(rooms)
}

/// GET /api/v1/rooms/:id
pub async fn get_room(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RoomStatus>, ApiError> {
    let room = find_room(&state, &id)?;
    Ok(Json(room_status(&state, room)))
}

/// PUT /api/v1/rooms/:id/controls/:control
///
/// Writing the control state triggers a recompute in the room task, so the
/// returned status may still show the previous MRT.
pub async fn set_control(
    State(state): State<AppState>,
    Path((id, control)): Path<(String, String)>,
    Json(body): Json<ControlUpdate>,
) -> Result<Json<RoomStatus>, ApiError> {
    let room = find_room(&state, &id)?;

    if control == PROFILE_SELECT_SUFFIX {
        let option = body
            .option
            .ok_or_else(|| ApiError::BadRequest("missing field `option`".to_string()))?;
        select_profile(&state.store, &state.registry, room, &option)?;
    } else {
        let number: NumberControl = control
            .parse()
            .map_err(|_| ControlError::UnknownControl(control.clone()))?;
        let value = body
            .value
            .ok_or_else(|| ApiError::BadRequest("missing field `value`".to_string()))?;
        set_number(&state.store, &state.registry, room, number, value)?;
    }

    Ok(Json(room_status(&state, room)))
}
