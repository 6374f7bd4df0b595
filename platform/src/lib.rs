//! Thin client for a Cumulocity-style multi-tenant IoT platform.
//!
//! The platform owns authentication, tenant resolution and the device
//! inventory; this crate only forwards REST calls and resolves
//! tenant-scoped [`PlatformClient`] handles:
//!
//! - [`SimpleApp`] — one tenant, credentials injected via `C8Y_*`
//!   environment variables.
//! - [`MultiTenantApp`] — a factory producing per-tenant and per-user
//!   clients for a microservice subscribed to by many tenants.

#![warn(missing_docs)]

pub mod apps;
pub mod client;
pub mod env;
pub mod error;
pub mod multi_tenant;
pub mod request;
pub mod simple;

pub use client::{Credentials, Device, PlatformClient, PlatformEvent, TenantDescriptor};
pub use error::PlatformError;
pub use multi_tenant::MultiTenantApp;
pub use request::RequestCredentials;
pub use simple::SimpleApp;
