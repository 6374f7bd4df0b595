//! Platform error types.

use thiserror::Error;

/// Errors talking to, or on behalf of, the IoT platform.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// Inbound credentials missing/invalid, or the platform rejected ours.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Tenant, application or object unknown to the platform.
    #[error("not found: {0}")]
    NotFound(String),

    /// Network/timeout/5xx talking to the platform; safe to retry on the
    /// next poll or tick.
    #[error("transient platform error: {0}")]
    Transient(String),

    /// Any other platform rejection.
    #[error("platform returned {status}: {message}")]
    Api {
        /// HTTP status returned by the platform.
        status: u16,
        /// Response body or status text.
        message: String,
    },

    /// Payload that could not be decoded.
    #[error("invalid platform response: {0}")]
    InvalidResponse(String),

    /// Missing or malformed process configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl PlatformError {
    /// Whether retrying at the next scheduled poll/tick may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

impl From<reqwest::Error> for PlatformError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            Self::Transient(err.to_string())
        } else if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Transient(err.to_string())
        }
    }
}
