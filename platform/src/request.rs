//! Inbound request credentials.
//!
//! The platform forwards the caller's credentials to the microservice in
//! headers and cookies. Their format is owned by the platform; this module
//! only extracts the pieces needed to build a client acting as the caller
//! and passes the rest through opaquely.

use base64::Engine;

use crate::client::Credentials;
use crate::error::PlatformError;

/// Caller credentials extracted from an inbound request.
#[derive(Debug, Clone, Default)]
pub struct RequestCredentials {
    /// Basic credentials with the tenant embedded in the username.
    pub basic: Option<Credentials>,
    /// Opaque bearer token (header or `authorization` cookie).
    pub bearer: Option<String>,
    /// XSRF token forwarded alongside cookie-based auth.
    pub xsrf: Option<String>,
}

impl RequestCredentials {
    /// Parse the forwarded `Authorization` header, `Cookie` header and
    /// XSRF token header.
    ///
    /// Fails with [`PlatformError::Authentication`] when no usable
    /// credentials are present or the basic payload is malformed.
    pub fn parse(
        authorization: Option<&str>,
        cookie_header: Option<&str>,
        xsrf_header: Option<&str>,
    ) -> Result<Self, PlatformError> {
        let cookies = cookie_header.map(parse_cookies).unwrap_or_default();
        let cookie = |name: &str| {
            cookies
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.clone())
        };

        let mut creds = Self {
            xsrf: xsrf_header
                .map(str::to_string)
                .or_else(|| cookie("XSRF-TOKEN")),
            ..Self::default()
        };

        match authorization {
            Some(value) if value.len() > 6 && value[..6].eq_ignore_ascii_case("basic ") => {
                creds.basic = Some(parse_basic(value[6..].trim())?);
            }
            Some(value) if value.len() > 7 && value[..7].eq_ignore_ascii_case("bearer ") => {
                creds.bearer = Some(value[7..].trim().to_string());
            }
            Some(other) => {
                return Err(PlatformError::Authentication(format!(
                    "unsupported authorization scheme: {}",
                    other.split_whitespace().next().unwrap_or("<empty>")
                )));
            }
            None => {}
        }

        if creds.basic.is_none() && creds.bearer.is_none() {
            // Cookie-based (OAuth) sessions forward the token as a cookie.
            creds.bearer = cookie("authorization")
                .map(|v| v.strip_prefix("Bearer ").unwrap_or(&v).to_string());
        }

        if creds.basic.is_none() && creds.bearer.is_none() {
            return Err(PlatformError::Authentication(
                "no credentials in request".to_string(),
            ));
        }
        Ok(creds)
    }

    /// Tenant id, when the credential format carries it.
    pub fn tenant_id(&self) -> Option<&str> {
        self.basic.as_ref().map(|c| c.tenant.as_str())
    }
}

fn parse_basic(encoded: &str) -> Result<Credentials, PlatformError> {
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|_| PlatformError::Authentication("undecodable basic credentials".into()))?;
    let decoded = String::from_utf8(decoded)
        .map_err(|_| PlatformError::Authentication("non-UTF-8 basic credentials".into()))?;
    let (username, password) = decoded
        .split_once(':')
        .ok_or_else(|| PlatformError::Authentication("malformed basic credentials".into()))?;
    let (tenant, user) = username.split_once('/').ok_or_else(|| {
        PlatformError::Authentication("basic credentials carry no tenant".into())
    })?;
    if tenant.is_empty() || user.is_empty() {
        return Err(PlatformError::Authentication(
            "basic credentials carry no tenant".into(),
        ));
    }
    Ok(Credentials::new(tenant, user, password))
}

/// Split a `Cookie` header into name/value pairs.
pub fn parse_cookies(header: &str) -> Vec<(String, String)> {
    header
        .split(';')
        .filter_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), value.trim().to_string()))
        })
        .collect()
}
