use anyhow::Result;
use tracing::{info, warn};
use virtual_mrt::{api, config, controls, host, rooms, telemetry};

use config::Config;
use host::{ControlRegistry, StateStore};
use telemetry::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cfg = Config::load()?;
    if cfg.rooms.is_empty() {
        warn!("no rooms configured, only the state API will be useful");
    }

    let store = StateStore::new(cfg.state.event_buffer);
    let registry = ControlRegistry::new();

    // Rooms start before their controls exist and pick them up on the
    // registration events.
    let tasks = rooms::spawn_rooms(&store, &registry, &cfg.rooms);
    for room in &cfg.rooms {
        controls::register_room_controls(&store, &registry, room);
    }

    let addr = cfg.server.socket_addr()?;
    info!(%addr, rooms = cfg.rooms.len(), "starting Virtual MRT");

    let app = api::router(api::AppState::new(cfg, store, registry));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(telemetry::shutdown_signal())
        .await?;

    for task in tasks {
        task.abort();
    }
    warn!("shutdown complete");
    Ok(())
}
