//! Calling-user introspection endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use crate::error::ApiError;
use crate::models::{DeviceInfo, UserResponse};
use crate::routes::request_credentials;
use crate::state::AppState;

/// Resolve the calling user and list the devices they can see.
///
/// Unlike `/tenant` this acts as the caller, not as the tenant's service
/// identity.
#[utoipa::path(
    get,
    path = "/user",
    responses(
        (status = 200, description = "Username and visible devices", body = UserResponse),
        (status = 401, description = "No credentials in request", body = ErrorBody),
    ),
    tag = "tenancy"
)]
pub async fn user_info(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<UserResponse>, ApiError> {
    let credentials = request_credentials(&headers)?;
    let client = state.app.user_instance(&credentials)?;
    let descriptor = client.descriptor().await?;
    tracing::info!(
        tenant = %descriptor.tenant_id,
        user = %descriptor.username,
        "resolved user instance"
    );
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
