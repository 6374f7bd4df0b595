//! Tenant introspection endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use crate::error::ApiError;
use crate::models::{DeviceInfo, TenantResponse};
use crate::routes::request_credentials;
use crate::state::AppState;

/// Resolve the caller's tenant and list its device inventory.
///
/// The subscribed tenant's credentials arrive in the forwarded request
/// metadata; the tenant-scoped service client is resolved from them.
#[utoipa::path(
    get,
    path = "/tenant",
    responses(
        (status = 200, description = "Tenant descriptor and devices", body = TenantResponse),
        (status = 401, description = "No credentials in request", body = ErrorBody),
        (status = 404, description = "Caller's tenant is not subscribed", body = ErrorBody),
    ),
    tag = "tenancy"
)]
pub async fn tenant_info(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<TenantResponse>, ApiError> {
    let credentials = request_credentials(&headers)?;
    let client = state.app.tenant_instance_for(&credentials).await?;
    let descriptor = client.descriptor().await?;
    tracing::info!(
        tenant = %descriptor.tenant_id,
        user = %descriptor.username,
        "resolved tenant instance"
    );
    let devices = client
        .devices()
        .await?
        .into_iter()
        .map(DeviceInfo::from)
        .collect();
    Ok(Json(TenantResponse {
        tenant: descriptor.into(),
        devices,
    }))
}
