pub mod error;
pub mod health;
pub mod rooms;
pub mod states;

use axum::{
    routing::{get, put},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::Config;
use crate::host::{ControlRegistry, StateStore};

#[derive(Clone)]
pub struct AppState {
    pub cfg: Config,
    pub store: StateStore,
    pub registry: ControlRegistry,
}

impl AppState {
    pub fn new(cfg: Config, store: StateStore, registry: ControlRegistry) -> Self {
        Self {
            cfg,
            store,
            registry,
        }
    }
}

fn v1_router() -> Router<AppState> {
    Router::new()
        .route("/rooms", get(rooms::list_rooms))
        .route("/rooms/:id", get(rooms::get_room))
        .route("/rooms/:id/controls/:control", put(rooms::set_control))
        .route("/states", get(states::list_states))
        .route("/states/:entity_id", get(states::get_state).put(states::put_state))
}

pub fn router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.cfg.server.request_timeout_secs);

    Router::new()
        .route("/healthz", get(health::healthz))
        .nest("/api/v1", v1_router())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(axum::extract::DefaultBodyLimit::max(1024 * 1024))
                .layer(TimeoutLayer::new(timeout)),
        )
        .layer(TraceLayer::new_for_http())
}
