//! HTTP routes.

pub mod debug;
pub mod health;
pub mod subscribers;
pub mod tenant;
pub mod user;

use axum::http::HeaderMap;

use cumulo_platform::RequestCredentials;

use crate::error::ApiError;

/// Extract the caller's forwarded credentials from the inbound headers.
///
/// Missing or undecodable inbound credentials are a 401; a 403 is reserved
/// for credentials the platform itself rejects.
pub(crate) fn request_credentials(headers: &HeaderMap) -> Result<RequestCredentials, ApiError> {
    let value = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    RequestCredentials::parse(
        value("authorization"),
        value("cookie"),
        value("x-xsrf-token"),
    )
    .map_err(|err| ApiError::unauthorized(err.to_string()))
}
