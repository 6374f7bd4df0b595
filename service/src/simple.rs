//! Single-tenant entry point surface.
//!
//! Per-tenant deployments talk to exactly one tenant with injected
//! credentials; there is no registry and no subscription listener.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;

use cumulo_platform::request::parse_cookies;
use cumulo_platform::{PlatformClient, PlatformError, SimpleApp};
use cumulo_tenancy::ListenerHandle;

use crate::error::ApiError;
use crate::models::{DeviceInfo, EventInfo, EventsResponse, HealthResponse, UserResponse};
use crate::routes::request_credentials;

/// State of the single-tenant surface.
pub struct SimpleState {
    /// The tenant's application context.
    pub app: SimpleApp,
}

/// Build the single-tenant HTTP surface.
pub fn build_simple_router(state: Arc<SimpleState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/debug", get(debug_info))
        .route("/user", get(user_info))
        .route("/events/:device_id", get(event_info))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

#[derive(Serialize)]
struct SimpleDebugResponse {
    headers: BTreeMap<String, String>,
    cookies: BTreeMap<String, String>,
}

async fn debug_info(headers: HeaderMap) -> Json<SimpleDebugResponse> {
    let cookies = headers
        .get("cookie")
        .and_then(|v| v.to_str().ok())
        .map(|raw| parse_cookies(raw).into_iter().collect())
        .unwrap_or_default();
    let headers = headers
        .iter()
        .map(|(name, value)| {
            (
                name.to_string(),
                value.to_str().unwrap_or("<binary>").to_string(),
            )
        })
        .collect();
    Json(SimpleDebugResponse { headers, cookies })
}

async fn user_info(
    State(state): State<Arc<SimpleState>>,
    headers: HeaderMap,
) -> Result<Json<UserResponse>, ApiError> {
    let credentials = request_credentials(&headers)?;
    let client = state.app.user_instance(&credentials)?;
    let descriptor = client.descriptor().await?;
    let devices = client
        .devices()
        .await?
        .into_iter()
        .map(DeviceInfo::from)
        .collect();
    Ok(Json(UserResponse {
        username: descriptor.username,
        devices,
    }))
}

async fn event_info(
    State(state): State<Arc<SimpleState>>,
    Path(device_id): Path<String>,
) -> Result<Json<EventsResponse>, ApiError> {
    let client = state.app.client();
    // Verify the device exists so unknown ids get a meaningful 404.
    match client.managed_object(&device_id).await {
        Ok(_) => {}
        Err(PlatformError::NotFound(_)) => {
            return Err(ApiError::not_found(format!("No such device: {device_id}")));
        }
        Err(other) => return Err(other.into()),
    }
    let events = client
        .events(&device_id)
        .await?
        .into_iter()
        .map(EventInfo::from)
        .collect();
    Ok(Json(EventsResponse { events }))
}

/// Spawn the periodic device sweep: log every registered device per tick.
pub fn start_device_sweep(client: Arc<PlatformClient>, interval: Duration) -> ListenerHandle {
    let (stop_tx, mut stop_rx) = watch::channel(false);
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = stop_rx.changed() => break,
            }
            match client.devices().await {
                Ok(devices) => {
                    for device in devices {
                        tracing::info!("processing device '{}' ({})", device.name, device.id);
                    }
                }
                Err(err) => tracing::warn!("device sweep failed: {err}"),
            }
        }
        tracing::info!("device sweep stopped");
    });
    ListenerHandle::from_parts(stop_tx, task)
}
