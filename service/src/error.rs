//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use cumulo_platform::PlatformError;

use crate::models::ErrorBody;

/// Error a route handler surfaces to the caller as `{"error": msg}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// 401 — no usable credentials in the request.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    /// 403 — authenticated but not allowed.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: message.into(),
        }
    }

    /// 404 with a caller-facing message.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

impl From<PlatformError> for ApiError {
    fn from(err: PlatformError) -> Self {
        let status = match &err {
            // Inbound credentials the platform (or parsing) rejected.
            PlatformError::Authentication(_) => StatusCode::FORBIDDEN,
            PlatformError::NotFound(_) => StatusCode::NOT_FOUND,
            PlatformError::Transient(_) => StatusCode::BAD_GATEWAY,
            PlatformError::Api { .. }
            | PlatformError::InvalidResponse(_)
            | PlatformError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, "request failed: {}", self.message);
        }
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_error_status_mapping() {
        let cases = [
            (PlatformError::Authentication("denied".into()), 403),
            (PlatformError::NotFound("gone".into()), 404),
            (PlatformError::Transient("timeout".into()), 502),
            (
                PlatformError::Api {
                    status: 409,
                    message: "conflict".into(),
                },
                500,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status.as_u16(), expected);
        }
    }
}
