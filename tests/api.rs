//! HTTP API tests, driven in-process with `tower::ServiceExt::oneshot`.

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use virtual_mrt::api::{router, AppState};
use virtual_mrt::config::{Config, ServerConfig, StateConfig};
use virtual_mrt::controls::register_room_controls;
use virtual_mrt::domain::{Orientation, RoomConfig, RoomProfile};
use virtual_mrt::host::{ControlRegistry, StateStore};
use virtual_mrt::rooms::RoomRuntime;

fn config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            request_timeout_secs: 5,
        },
        state: StateConfig::default(),
        rooms: vec![RoomConfig::new(
            "study",
            RoomProfile::OneWallSmallWindow,
            Orientation::East,
            "sensor.study_air",
            "weather.home",
        )],
    }
}

fn app() -> (Router, StateStore, ControlRegistry, Config) {
    let cfg = config();
    let store = StateStore::new(64);
    let registry = ControlRegistry::new();
    for room in &cfg.rooms {
        register_room_controls(&store, &registry, room);
    }
    let app = router(AppState::new(cfg.clone(), store.clone(), registry.clone()));
    (app, store, registry, cfg)
}

async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            builder = builder.header("content-type", "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

#[tokio::test]
async fn healthz_reports_rooms() {
    let (app, ..) = app();
    let (status, body) = send(app, Method::GET, "/healthz", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["rooms"], 1);
    assert_eq!(body["controls"], 6);
}

#[tokio::test]
async fn room_status_before_and_after_update() {
    let (app, store, registry, cfg) = app();

    let (status, body) = send(app.clone(), Method::GET, "/api/v1/rooms/study", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profile"], "one_wall_small_window");
    assert_eq!(body["orientation"], "E");
    assert_eq!(body["active_profile"], "one_wall_small_window");
    assert_eq!(body["controls"]["k_solar"], 0.8);
    assert_eq!(body["mrt"]["value"], Value::Null);

    // Feed inputs through the API, then run the room once
    let (status, _) = send(
        app.clone(),
        Method::PUT,
        "/api/v1/states/sensor.study_air",
        Some(json!({ "state": "20.5" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(
        app.clone(),
        Method::PUT,
        "/api/v1/states/weather.home",
        Some(json!({ "state": "rainy", "attributes": { "temperature": 4.0 } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let mut runtime = RoomRuntime::new(cfg.rooms[0].clone(), store.clone(), registry.clone());
    let outcome = runtime.recompute();
    let published = outcome.reading().unwrap().value;

    let (_, body) = send(app, Method::GET, "/api/v1/rooms", None).await;
    let room = &body[0];
    assert_eq!(room["id"], "study");
    assert_eq!(room["mrt"]["value"], published);
    assert_eq!(room["mrt"]["diagnostics"]["rain_source"], "condition_string");
    assert_eq!(room["mrt"]["diagnostics"]["wind_source"], "fallback");
    assert!(room["operative_temperature"]["value"].is_number());
}

#[tokio::test]
async fn unknown_room_is_404() {
    let (app, ..) = app();
    let (status, body) = send(app, Method::GET, "/api/v1/rooms/garage", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NotFound");
}

#[tokio::test]
async fn set_number_control() {
    let (app, store, ..) = app();
    let (status, body) = send(
        app,
        Method::PUT,
        "/api/v1/rooms/study/controls/k_loss",
        Some(json!({ "value": 0.25 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["controls"]["k_loss"], 0.25);
    assert_eq!(
        store.get("number.study_k_loss").and_then(|s| s.numeric_state()),
        Some(0.25)
    );
}

#[tokio::test]
async fn control_errors() {
    let (app, ..) = app();

    let (status, _) = send(
        app.clone(),
        Method::PUT,
        "/api/v1/rooms/study/controls/k_solar",
        Some(json!({ "value": 3.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        app.clone(),
        Method::PUT,
        "/api/v1/rooms/study/controls/k_wind",
        Some(json!({ "value": 0.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        app.clone(),
        Method::PUT,
        "/api/v1/rooms/study/controls/f_out",
        Some(json!({ "option": "attic" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        app,
        Method::PUT,
        "/api/v1/rooms/study/controls/profile",
        Some(json!({ "option": "greenhouse" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn select_profile_loads_coefficients() {
    let (app, ..) = app();
    let (status, body) = send(
        app,
        Method::PUT,
        "/api/v1/rooms/study/controls/profile",
        Some(json!({ "option": "attic" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["active_profile"], "attic");
    assert_eq!(body["profile"], "one_wall_small_window");
    assert_eq!(body["controls"]["f_out"], 0.9);
    assert_eq!(body["controls"]["k_solar"], 1.5);
}

#[tokio::test]
async fn state_roundtrip_and_missing() {
    let (app, ..) = app();

    let (status, _) = send(app.clone(), Method::GET, "/api/v1/states/sun.sun", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        app.clone(),
        Method::PUT,
        "/api/v1/states/sun.sun",
        Some(json!({ "state": "above_horizon", "attributes": { "elevation": 42.5 } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entity_id"], "sun.sun");

    let (status, body) = send(app.clone(), Method::GET, "/api/v1/states/sun.sun", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["attributes"]["elevation"], 42.5);

    let (status, _) = send(
        app,
        Method::PUT,
        "/api/v1/states/not_an_entity",
        Some(json!({ "state": "on" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
