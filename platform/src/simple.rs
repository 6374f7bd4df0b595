//! Single-tenant application context.

use std::sync::Arc;

use crate::client::{Credentials, PlatformClient};
use crate::env::{optional_var, require_var};
use crate::error::PlatformError;
use crate::request::RequestCredentials;

/// Per-tenant application context: one service client for the tenant the
/// microservice is deployed into, plus request-scoped user clients.
pub struct SimpleApp {
    client: Arc<PlatformClient>,
    application_key: Option<String>,
}

impl SimpleApp {
    /// Build from explicit credentials.
    pub fn new(
        base_url: impl Into<String>,
        credentials: Credentials,
        application_key: Option<String>,
    ) -> Self {
        let client = PlatformClient::new(base_url, credentials)
            .with_application_key(application_key.clone());
        Self {
            client: Arc::new(client),
            application_key,
        }
    }

    /// Build from the `C8Y_*` variables the platform injects.
    pub fn from_env() -> Result<Self, PlatformError> {
        let base_url = require_var("C8Y_BASEURL")?;
        let credentials = Credentials::new(
            require_var("C8Y_TENANT")?,
            require_var("C8Y_USER")?,
            require_var("C8Y_PASSWORD")?,
        );
        Ok(Self::new(
            base_url,
            credentials,
            optional_var("C8Y_APPLICATION_KEY"),
        ))
    }

    /// The tenant's service client.
    pub fn client(&self) -> Arc<PlatformClient> {
        Arc::clone(&self.client)
    }

    /// Request-scoped client acting as the calling user.
    pub fn user_instance(
        &self,
        request: &RequestCredentials,
    ) -> Result<PlatformClient, PlatformError> {
        let client = if let Some(basic) = &request.basic {
            PlatformClient::new(self.client.base_url(), basic.clone())
        } else if let Some(token) = &request.bearer {
            PlatformClient::from_bearer(self.client.base_url(), token, request.xsrf.clone())
        } else {
            return Err(PlatformError::Authentication(
                "no credentials in request".to_string(),
            ));
        };
        Ok(client.with_application_key(self.application_key.clone()))
    }
}
