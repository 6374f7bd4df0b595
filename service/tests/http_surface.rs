//! HTTP surface tests against a mock platform.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::Query;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderValue, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use axum_test::TestServer;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::{json, Value};

use cumulo_platform::{Credentials, MultiTenantApp};
use cumulo_service::{build_router, AppState};
use cumulo_tenancy::TenantRegistry;

async fn subscriptions() -> Json<Value> {
    Json(json!({
        "users": [
            {"tenant": "t100", "name": "service_t100", "password": "pw100"}
        ]
    }))
}

async fn managed_objects(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    if params.get("withTotalPages").map(String::as_str) == Some("true") {
        Json(json!({
            "managedObjects": [],
            "statistics": {"totalPages": 1}
        }))
    } else {
        Json(json!({
            "managedObjects": [
                {"id": "1", "name": "d1", "type": "thermostat"}
            ]
        }))
    }
}

/// Bind a stub platform on an ephemeral port, return its base URL.
async fn spawn_platform() -> String {
    let app = Router::new()
        .route(
            "/application/currentApplication/subscriptions",
            get(subscriptions),
        )
        .route("/inventory/managedObjects", get(managed_objects));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn spawn_service() -> TestServer {
    let base_url = spawn_platform().await;
    let app = Arc::new(MultiTenantApp::new(
        base_url,
        Credentials::new("t999", "servicebootstrap", "bootstrap-pw"),
        None,
    ));
    let registry = TenantRegistry::new();
    registry.add("t100");
    let state = Arc::new(AppState::new(app, registry));
    TestServer::new(build_router(state)).unwrap()
}

fn basic_auth(tenant: &str, user: &str, password: &str) -> HeaderValue {
    let encoded = STANDARD.encode(format!("{tenant}/{user}:{password}"));
    HeaderValue::from_str(&format!("Basic {encoded}")).unwrap()
}

#[tokio::test]
async fn test_health() {
    let server = spawn_service().await;
    let response = server.get("/health").await;
    response.assert_status(StatusCode::OK);
    response.assert_json(&json!({"status": "ok"}));
}

#[tokio::test]
async fn test_tenant_requires_credentials() {
    let server = spawn_service().await;
    let response = server.get("/tenant").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_tenant_resolves_service_identity_and_devices() {
    let server = spawn_service().await;
    let response = server
        .get("/tenant")
        .add_header(AUTHORIZATION, basic_auth("t100", "alice", "secret"))
        .await;
    response.assert_status(StatusCode::OK);

    let body: Value = response.json();
    // The tenant block carries the service identity, not the caller.
    assert_eq!(body["tenant"]["tenant_id"], "t100");
    assert_eq!(body["tenant"]["username"], "service_t100");
    assert_eq!(
        body["devices"],
        json!([{"name": "d1", "id": "1", "type": "thermostat"}])
    );
}

#[tokio::test]
async fn test_tenant_of_unsubscribed_caller_is_not_found() {
    let server = spawn_service().await;
    let response = server
        .get("/tenant")
        .add_header(AUTHORIZATION, basic_auth("t404", "alice", "secret"))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_user_acts_as_the_caller() {
    let server = spawn_service().await;
    let response = server
        .get("/user")
        .add_header(AUTHORIZATION, basic_auth("t100", "alice", "secret"))
        .await;
    response.assert_status(StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["username"], "alice");
    assert_eq!(body["devices"][0]["id"], "1");
}

#[tokio::test]
async fn test_subscribers_rejects_non_provider_tenants() {
    let server = spawn_service().await;
    let response = server
        .get("/subscribers")
        .add_header(AUTHORIZATION, basic_auth("t100", "alice", "secret"))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    // No subscriber data leaks alongside the rejection.
    let body: Value = response.json();
    assert_eq!(body, json!({"error": "Only allowed for the provider tenant."}));
}

#[tokio::test]
async fn test_subscribers_lists_tenants_for_the_provider() {
    let server = spawn_service().await;
    let response = server
        .get("/subscribers")
        .add_header(AUTHORIZATION, basic_auth("t999", "admin", "admin-pw"))
        .await;
    response.assert_status(StatusCode::OK);

    let body: Value = response.json();
    let subscribers = body["subscribers"].as_array().unwrap();
    assert_eq!(subscribers.len(), 1);
    assert_eq!(subscribers[0]["tenant_id"], "t100");
    assert_eq!(subscribers[0]["num_devices"], 1);
}

#[tokio::test]
async fn test_debug_echoes_request_and_subscribers() {
    let server = spawn_service().await;
    let response = server
        .get("/debug")
        .add_header(
            axum::http::header::COOKIE,
            HeaderValue::from_static("session=abc; theme=dark"),
        )
        .await;
    response.assert_status(StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["cookies"]["session"], "abc");
    assert_eq!(body["cookies"]["theme"], "dark");
    assert_eq!(body["subscribers"], json!(["t100"]));
    assert!(body["headers"].as_object().unwrap().contains_key("cookie"));
}

#[tokio::test]
async fn test_malformed_basic_credentials_are_unauthorized() {
    let server = spawn_service().await;
    let response = server
        .get("/user")
        .add_header(AUTHORIZATION, HeaderValue::from_static("Basic not-base64!"))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}
