//! Single-tenant surface tests against a mock platform.

use std::sync::Arc;

use axum::extract::Path;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use axum_test::TestServer;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::{json, Value};

use cumulo_platform::{Credentials, SimpleApp};
use cumulo_service::simple::{build_simple_router, SimpleState};

async fn managed_object(Path(id): Path<String>) -> Response {
    if id == "1" {
        Json(json!({"id": "1", "name": "d1"})).into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

async fn device_events() -> Json<Value> {
    Json(json!({
        "events": [
            {"time": "2024-05-01T10:00:00.000Z", "type": "c8y_Alarm", "text": "door open"}
        ]
    }))
}

async fn devices() -> Json<Value> {
    Json(json!({
        "managedObjects": [{"id": "1", "name": "d1"}]
    }))
}

async fn spawn_platform() -> String {
    let app = Router::new()
        .route("/inventory/managedObjects", get(devices))
        .route("/inventory/managedObjects/:id", get(managed_object))
        .route("/event/events", get(device_events));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn spawn_service() -> TestServer {
    let base_url = spawn_platform().await;
    let app = SimpleApp::new(
        base_url,
        Credentials::new("t100", "service_t100", "pw100"),
        None,
    );
    let state = Arc::new(SimpleState { app });
    TestServer::new(build_simple_router(state)).unwrap()
}

#[tokio::test]
async fn test_events_for_a_known_device() {
    let server = spawn_service().await;
    let response = server.get("/events/1").await;
    response.assert_status(StatusCode::OK);
    response.assert_json(&json!({
        "events": [
            {"datetime": "2024-05-01T10:00:00.000Z", "type": "c8y_Alarm", "text": "door open"}
        ]
    }));
}

#[tokio::test]
async fn test_events_for_an_unknown_device() {
    let server = spawn_service().await;
    let response = server.get("/events/99").await;
    response.assert_status(StatusCode::NOT_FOUND);
    response.assert_json(&json!({"error": "No such device: 99"}));
}

#[tokio::test]
async fn test_user_lists_caller_devices() {
    let server = spawn_service().await;
    let encoded = STANDARD.encode("t100/alice:secret");
    let response = server
        .get("/user")
        .add_header(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Basic {encoded}")).unwrap(),
        )
        .await;
    response.assert_status(StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["username"], "alice");
    assert_eq!(body["devices"][0]["name"], "d1");
}

#[tokio::test]
async fn test_debug_has_no_subscriber_block() {
    let server = spawn_service().await;
    let response = server.get("/debug").await;
    response.assert_status(StatusCode::OK);

    let body: Value = response.json();
    assert!(body["headers"].is_object());
    assert!(body["cookies"].is_object());
    assert!(body.get("subscribers").is_none());
}
