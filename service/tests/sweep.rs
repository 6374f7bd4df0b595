//! Background sweep behavior against a mock platform.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::Query;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use cumulo_platform::{Credentials, MultiTenantApp};
use cumulo_service::processor::sweep_once;
use cumulo_tenancy::TenantRegistry;

async fn subscriptions() -> Json<Value> {
    Json(json!({
        "users": [
            {"tenant": "t100", "name": "service_t100", "password": "pw100"},
            {"tenant": "t200", "name": "service_t200", "password": "pw200"}
        ]
    }))
}

async fn managed_objects(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    assert_eq!(params.get("withTotalPages").map(String::as_str), Some("true"));
    Json(json!({"managedObjects": [], "statistics": {"totalPages": 3}}))
}

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

#[tokio::test]
async fn test_sweep_visits_every_registered_tenant() {
    let base_url = spawn_platform().await;
    let app = Arc::new(MultiTenantApp::new(
        base_url,
        Credentials::new("t999", "servicebootstrap", "bootstrap-pw"),
        None,
    ));
    let registry = TenantRegistry::new();
    registry.add("t100");
    registry.add("t200");

    let (processed, failed) = sweep_once(&app, &registry).await;
    assert_eq!(processed, 2);
    assert_eq!(failed, 0);
}

#[tokio::test]
async fn test_sweep_continues_past_a_failing_tenant() {
    let base_url = spawn_platform().await;
    let app = Arc::new(MultiTenantApp::new(
        base_url,
        Credentials::new("t999", "servicebootstrap", "bootstrap-pw"),
        None,
    ));
    let registry = TenantRegistry::new();
    // Stale registry entry for a tenant the platform no longer reports.
    registry.add("t050");
    registry.add("t100");
    registry.add("t200");

    let (processed, failed) = sweep_once(&app, &registry).await;
    assert_eq!(processed, 2);
    assert_eq!(failed, 1);
}
