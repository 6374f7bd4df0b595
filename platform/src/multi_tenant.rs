//! Multi-tenant application context.
//!
//! A multi-tenant microservice never talks to the platform as itself; it
//! acts either as a subscribed tenant's service user (resolved from the
//! bootstrap credentials) or as the calling user of an inbound request.
//! [`MultiTenantApp`] is the factory for both kinds of client.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use cumulo_tenancy::{SourceError, SubscriptionSource};

use crate::client::{Credentials, PlatformClient};
use crate::env::{optional_var, require_var};
use crate::error::PlatformError;
use crate::request::RequestCredentials;

/// Factory for tenant- and user-scoped platform clients.
///
/// Tenant-scoped clients use per-tenant service-user credentials fetched
/// with the bootstrap identity and are cached for the process lifetime,
/// keyed by exact tenant id. User-scoped clients forward the caller's own
/// credentials and live for one request.
pub struct MultiTenantApp {
    base_url: String,
    application_key: Option<String>,
    bootstrap: Arc<PlatformClient>,
    bootstrap_tenant: String,
    tenant_clients: DashMap<String, Arc<PlatformClient>>,
}

impl MultiTenantApp {
    /// Build from explicit bootstrap credentials.
    pub fn new(
        base_url: impl Into<String>,
        bootstrap: Credentials,
        application_key: Option<String>,
    ) -> Self {
        let base_url = base_url.into();
        let bootstrap_tenant = bootstrap.tenant.clone();
        let client = PlatformClient::new(base_url.clone(), bootstrap)
            .with_application_key(application_key.clone());
        Self {
            base_url: client.base_url().to_string(),
            application_key,
            bootstrap: Arc::new(client),
            bootstrap_tenant,
            tenant_clients: DashMap::new(),
        }
    }

    /// Build from the `C8Y_*` variables the platform injects.
    pub fn from_env() -> Result<Self, PlatformError> {
        let base_url = require_var("C8Y_BASEURL")?;
        let bootstrap = Credentials::new(
            require_var("C8Y_BOOTSTRAP_TENANT")?,
            require_var("C8Y_BOOTSTRAP_USER")?,
            require_var("C8Y_BOOTSTRAP_PASSWORD")?,
        );
        Ok(Self::new(
            base_url,
            bootstrap,
            optional_var("C8Y_APPLICATION_KEY"),
        ))
    }

    /// The bootstrap (provider) client.
    pub fn bootstrap_client(&self) -> Arc<PlatformClient> {
        Arc::clone(&self.bootstrap)
    }

    /// Tenant the bootstrap credentials belong to (the provider tenant).
    pub fn bootstrap_tenant(&self) -> &str {
        &self.bootstrap_tenant
    }

    /// Cached tenant-scoped client for a known subscriber.
    ///
    /// On a cache miss the subscriber credentials are re-fetched once;
    /// `NotFound` if the tenant is not a recognized subscriber.
    pub async fn tenant_instance(
        &self,
        tenant_id: &str,
    ) -> Result<Arc<PlatformClient>, PlatformError> {
        if let Some(client) = self.tenant_clients.get(tenant_id) {
            return Ok(Arc::clone(&client));
        }
        self.refresh_tenant_clients().await?;
        self.tenant_clients
            .get(tenant_id)
            .map(|c| Arc::clone(&c))
            .ok_or_else(|| {
                PlatformError::NotFound(format!("tenant '{tenant_id}' is not subscribed"))
            })
    }

    /// Request-scoped client acting as the calling user.
    pub fn user_instance(
        &self,
        request: &RequestCredentials,
    ) -> Result<PlatformClient, PlatformError> {
        let client = if let Some(basic) = &request.basic {
            PlatformClient::new(self.base_url.clone(), basic.clone())
        } else if let Some(token) = &request.bearer {
            PlatformClient::from_bearer(self.base_url.clone(), token, request.xsrf.clone())
        } else {
            return Err(PlatformError::Authentication(
                "no credentials in request".to_string(),
            ));
        };
        Ok(client.with_application_key(self.application_key.clone()))
    }

    /// Tenant-scoped client for the tenant of an inbound request.
    pub async fn tenant_instance_for(
        &self,
        request: &RequestCredentials,
    ) -> Result<Arc<PlatformClient>, PlatformError> {
        let tenant_id = match request.tenant_id() {
            Some(t) => t.to_string(),
            // Token credentials don't carry the tenant; ask the platform.
            None => self.user_instance(request)?.current_tenant().await?,
        };
        self.tenant_instance(&tenant_id).await
    }

    /// Drop all cached tenant clients; they are re-minted on demand.
    pub fn clear_tenant_cache(&self) {
        self.tenant_clients.clear();
    }

    /// Fetch the subscriber credential list and synchronize the client
    /// cache with it. Each cache entry is keyed by the exact tenant id of
    /// its own credentials; tenants absent from the latest list are
    /// evicted.
    async fn refresh_tenant_clients(&self) -> Result<BTreeSet<String>, PlatformError> {
        let credentials = self.bootstrap.subscription_credentials().await?;
        let mut tenants = BTreeSet::new();
        for creds in credentials {
            let tenant = creds.tenant.clone();
            tenants.insert(tenant.clone());
            self.tenant_clients.entry(tenant).or_insert_with(|| {
                Arc::new(
                    PlatformClient::new(self.base_url.clone(), creds)
                        .with_application_key(self.application_key.clone()),
                )
            });
        }
        self.tenant_clients.retain(|tenant, _| tenants.contains(tenant));
        Ok(tenants)
    }
}

#[async_trait]
impl SubscriptionSource for MultiTenantApp {
    async fn subscribed_tenants(&self) -> Result<BTreeSet<String>, SourceError> {
        Ok(self.refresh_tenant_clients().await?)
    }
}
