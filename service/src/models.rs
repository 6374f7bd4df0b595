//! Response payloads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use cumulo_platform::{Device, PlatformEvent, TenantDescriptor};

/// Liveness response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Always `"ok"` while the process serves requests.
    pub status: String,
}

/// Echo of the inbound request plus the current subscriber snapshot.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DebugResponse {
    /// Inbound headers, as received.
    pub headers: BTreeMap<String, String>,
    /// Inbound cookies, as received.
    pub cookies: BTreeMap<String, String>,
    /// Currently subscribed tenants, sorted.
    pub subscribers: Vec<String>,
}

/// Tenant descriptor as exposed over HTTP.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TenantInfo {
    /// Tenant identifier.
    pub tenant_id: String,
    /// Platform base URL.
    pub base_url: String,
    /// Service username acting for the tenant.
    pub username: String,
}

impl From<TenantDescriptor> for TenantInfo {
    fn from(d: TenantDescriptor) -> Self {
        Self {
            tenant_id: d.tenant_id,
            base_url: d.base_url,
            username: d.username,
        }
    }
}

/// A device as exposed over HTTP.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeviceInfo {
    /// Display name.
    pub name: String,
    /// Object identifier.
    pub id: String,
    /// Device type fragment.
    #[serde(rename = "type")]
    pub device_type: Option<String>,
}

impl From<Device> for DeviceInfo {
    fn from(d: Device) -> Self {
        Self {
            name: d.name,
            id: d.id,
            device_type: d.device_type,
        }
    }
}

/// `/tenant` response: the caller's tenant and its device inventory.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TenantResponse {
    /// The resolved tenant.
    pub tenant: TenantInfo,
    /// Devices in the tenant's inventory.
    pub devices: Vec<DeviceInfo>,
}

/// One subscriber row of the `/subscribers` response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubscriberInfo {
    /// Tenant identifier.
    pub tenant_id: String,
    /// Platform base URL.
    pub base_url: String,
    /// Devices currently managed by the tenant.
    pub num_devices: u64,
}

/// `/subscribers` response (provider tenant only).
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubscribersResponse {
    /// All currently subscribed tenants.
    pub subscribers: Vec<SubscriberInfo>,
}

/// `/user` response: the calling user and the devices they can see.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    /// Calling username.
    pub username: String,
    /// Devices visible to the user.
    pub devices: Vec<DeviceInfo>,
}

/// One event row of the `/events/{device_id}` response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EventInfo {
    /// Event timestamp, platform-formatted.
    pub datetime: String,
    /// Event type.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Event text.
    pub text: String,
}

impl From<PlatformEvent> for EventInfo {
    fn from(e: PlatformEvent) -> Self {
        Self {
            datetime: e.time,
            event_type: e.event_type,
            text: e.text,
        }
    }
}

/// `/events/{device_id}` response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EventsResponse {
    /// Events recorded for the device.
    pub events: Vec<EventInfo>,
}

/// Error body: `{"error": "..."}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Human-readable error message.
    pub error: String,
}
