//! Tenant-scoped REST client.

use serde::{Deserialize, Serialize};

use crate::error::PlatformError;

/// Header carrying the application key on every platform call.
pub const APPLICATION_KEY_HEADER: &str = "X-Cumulocity-Application-Key";

/// Basic-auth credentials for one tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Tenant identifier, e.g. `t12345`.
    pub tenant: String,
    /// Username within the tenant.
    pub user: String,
    /// Password.
    pub password: String,
}

impl Credentials {
    /// Create credentials.
    pub fn new(
        tenant: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            tenant: tenant.into(),
            user: user.into(),
            password: password.into(),
        }
    }
}

/// How a client authenticates against the platform.
#[derive(Debug, Clone)]
pub(crate) enum Auth {
    /// `Basic tenant/user:password`.
    Basic(Credentials),
    /// Opaque bearer token forwarded from an inbound request.
    Bearer {
        token: String,
        xsrf: Option<String>,
    },
}

/// Descriptor of the tenant a client is bound to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TenantDescriptor {
    /// Tenant identifier.
    pub tenant_id: String,
    /// Platform base URL the client talks to.
    pub base_url: String,
    /// Username the client acts as.
    pub username: String,
}

/// A device from the tenant's inventory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Device {
    /// Object identifier.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Device type fragment.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub device_type: Option<String>,
}

/// An event attached to a device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformEvent {
    /// Event timestamp (platform-formatted, opaque).
    #[serde(default)]
    pub time: String,
    /// Event type.
    #[serde(rename = "type", default)]
    pub event_type: String,
    /// Event text.
    #[serde(default)]
    pub text: String,
}

/// An authenticated handle whose calls are confined to one tenant.
///
/// Clients are either service-scoped (basic auth with the tenant's service
/// user, cached for the process lifetime) or request-scoped (built from
/// forwarded caller credentials, dropped after the request).
#[derive(Debug, Clone)]
pub struct PlatformClient {
    base_url: String,
    pub(crate) auth: Auth,
    application_key: Option<String>,
    http: reqwest::Client,
}

impl PlatformClient {
    /// Client with basic credentials.
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            base_url: normalize(base_url.into()),
            auth: Auth::Basic(credentials),
            application_key: None,
            http: reqwest::Client::new(),
        }
    }

    /// Request-scoped client forwarding an opaque bearer token.
    pub fn from_bearer(
        base_url: impl Into<String>,
        token: impl Into<String>,
        xsrf: Option<String>,
    ) -> Self {
        Self {
            base_url: normalize(base_url.into()),
            auth: Auth::Bearer {
                token: token.into(),
                xsrf,
            },
            application_key: None,
            http: reqwest::Client::new(),
        }
    }

    /// Attach the microservice's application key to every call.
    pub fn with_application_key(mut self, key: Option<String>) -> Self {
        self.application_key = key;
        self
    }

    /// Platform base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Tenant id, when known without a platform round-trip.
    pub fn tenant_id(&self) -> Option<&str> {
        match &self.auth {
            Auth::Basic(c) => Some(&c.tenant),
            Auth::Bearer { .. } => None,
        }
    }

    /// Who this client is: tenant, base URL, username. Resolved locally
    /// for basic-auth clients, via the platform for token clients.
    pub async fn descriptor(&self) -> Result<TenantDescriptor, PlatformError> {
        match &self.auth {
            Auth::Basic(c) => Ok(TenantDescriptor {
                tenant_id: c.tenant.clone(),
                base_url: self.base_url.clone(),
                username: c.user.clone(),
            }),
            Auth::Bearer { .. } => Ok(TenantDescriptor {
                tenant_id: self.current_tenant().await?,
                base_url: self.base_url.clone(),
                username: self.current_user().await?,
            }),
        }
    }

    /// Tenant id as the platform sees this client.
    pub async fn current_tenant(&self) -> Result<String, PlatformError> {
        let tenant: CurrentTenant = self.get_json("/tenant/currentTenant").await?;
        Ok(tenant.name)
    }

    /// Username as the platform sees this client.
    pub async fn current_user(&self) -> Result<String, PlatformError> {
        let user: CurrentUser = self.get_json("/user/currentUser").await?;
        Ok(user.user_name)
    }

    /// All devices in the tenant's inventory.
    pub async fn devices(&self) -> Result<Vec<Device>, PlatformError> {
        let page: ManagedObjectPage = self
            .get_json("/inventory/managedObjects?fragmentType=c8y_IsDevice&pageSize=2000")
            .await?;
        Ok(page.managed_objects)
    }

    /// Number of devices in the tenant's inventory.
    ///
    /// With `pageSize=1` the platform's `totalPages` equals the object
    /// count.
    pub async fn device_count(&self) -> Result<u64, PlatformError> {
        let page: ManagedObjectPage = self
            .get_json(
                "/inventory/managedObjects?fragmentType=c8y_IsDevice&pageSize=1&withTotalPages=true",
            )
            .await?;
        Ok(page
            .statistics
            .and_then(|s| s.total_pages)
            .unwrap_or(page.managed_objects.len() as u64))
    }

    /// One managed object by id. `NotFound` when the id is unknown.
    pub async fn managed_object(&self, id: &str) -> Result<Device, PlatformError> {
        self.get_json(&format!("/inventory/managedObjects/{id}"))
            .await
    }

    /// Events recorded for a device.
    pub async fn events(&self, device_id: &str) -> Result<Vec<PlatformEvent>, PlatformError> {
        let page: EventPage = self
            .get_json(&format!("/event/events?source={device_id}&pageSize=2000"))
            .await?;
        Ok(page.events)
    }

    /// Per-tenant service users for every subscriber of the current
    /// microservice. Only meaningful for the bootstrap client.
    pub async fn subscription_credentials(&self) -> Result<Vec<Credentials>, PlatformError> {
        let page: SubscriptionPage = self
            .get_json("/application/currentApplication/subscriptions")
            .await?;
        Ok(page
            .users
            .into_iter()
            .map(|u| Credentials::new(u.tenant, u.name, u.password))
            .collect())
    }

    pub(crate) fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut req = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        match &self.auth {
            Auth::Basic(c) => {
                req = req.basic_auth(format!("{}/{}", c.tenant, c.user), Some(&c.password));
            }
            Auth::Bearer { token, xsrf } => {
                req = req.header(reqwest::header::AUTHORIZATION, format!("Bearer {token}"));
                if let Some(xsrf) = xsrf {
                    req = req.header("X-XSRF-TOKEN", xsrf);
                }
            }
        }
        if let Some(key) = &self.application_key {
            req = req.header(APPLICATION_KEY_HEADER, key);
        }
        req
    }

    pub(crate) async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, PlatformError> {
        let response = self.request(reqwest::Method::GET, path).send().await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }
}

/// Map a non-success platform response to an error kind.
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, PlatformError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(status_error(status.as_u16(), message))
}

fn status_error(status: u16, message: String) -> PlatformError {
    let message = if message.is_empty() {
        format!("HTTP {status}")
    } else {
        message
    };
    match status {
        401 | 403 => PlatformError::Authentication(message),
        404 => PlatformError::NotFound(message),
        s if s >= 500 => PlatformError::Transient(message),
        _ => PlatformError::Api { status, message },
    }
}

fn normalize(base_url: String) -> String {
    base_url.trim_end_matches('/').to_string()
}

#[derive(Deserialize)]
struct CurrentTenant {
    name: String,
}

#[derive(Deserialize)]
struct CurrentUser {
    #[serde(rename = "userName")]
    user_name: String,
}

#[derive(Deserialize)]
struct ManagedObjectPage {
    #[serde(rename = "managedObjects", default)]
    managed_objects: Vec<Device>,
    statistics: Option<PageStatistics>,
}

#[derive(Deserialize)]
struct PageStatistics {
    #[serde(rename = "totalPages")]
    total_pages: Option<u64>,
}

#[derive(Deserialize)]
struct SubscriptionPage {
    #[serde(default)]
    users: Vec<SubscriptionUser>,
}

#[derive(Deserialize)]
struct SubscriptionUser {
    tenant: String,
    name: String,
    password: String,
}

#[derive(Deserialize)]
struct EventPage {
    #[serde(default)]
    events: Vec<PlatformEvent>,
}
