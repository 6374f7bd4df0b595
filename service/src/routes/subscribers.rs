//! Subscriber listing, provider tenant only.

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use crate::error::ApiError;
use crate::models::{SubscriberInfo, SubscribersResponse};
use crate::routes::request_credentials;
use crate::state::AppState;

/// List all subscribed tenants with their device counts.
///
/// Only identities of the bootstrap (provider) tenant may call this;
/// everyone else gets a 403 and no subscriber data.
#[utoipa::path(
    get,
    path = "/subscribers",
    responses(
        (status = 200, description = "All subscribers", body = SubscribersResponse),
        (status = 401, description = "No credentials in request", body = ErrorBody),
        (status = 403, description = "Caller is not the provider tenant", body = ErrorBody),
    ),
    tag = "tenancy"
)]
pub async fn subscriber_info(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<SubscribersResponse>, ApiError> {
    let credentials = request_credentials(&headers)?;
    let caller = state.app.user_instance(&credentials)?;
    let caller_tenant = caller.descriptor().await?.tenant_id;
    if caller_tenant != state.app.bootstrap_tenant() {
        return Err(ApiError::forbidden(
            "Only allowed for the provider tenant.",
        ));
    }

    let mut subscribers = Vec::new();
    for tenant_id in state.subscribers() {
        let client = state.app.tenant_instance(&tenant_id).await?;
        subscribers.push(SubscriberInfo {
            tenant_id,
            base_url: client.base_url().to_string(),
            num_devices: client.device_count().await?,
        });
    }
    Ok(Json(SubscribersResponse { subscribers }))
}
