//! Debug echo endpoint.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use cumulo_platform::request::parse_cookies;

use crate::models::DebugResponse;
use crate::state::AppState;

/// Echo the inbound headers/cookies and the current subscriber snapshot.
///
/// Unauthenticated and it echoes forwarded credentials — useful while
/// wiring a deployment, an operational risk to leave enabled after that.
#[utoipa::path(
    get,
    path = "/debug",
    responses((status = 200, description = "Request echo", body = DebugResponse)),
    tag = "ops"
)]
pub async fn debug_info(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Json<DebugResponse> {
    let cookies = headers
        .get("cookie")
        .and_then(|v| v.to_str().ok())
        .map(|raw| parse_cookies(raw).into_iter().collect())
        .unwrap_or_default();
    let headers: BTreeMap<String, String> = headers
        .iter()
        .map(|(name, value)| {
            (
                name.to_string(),
                value.to_str().unwrap_or("<binary>").to_string(),
            )
        })
        .collect();
    Json(DebugResponse {
        headers,
        cookies,
        subscribers: state.subscribers(),
    })
}
