//! Shared request-handler state.

use std::sync::Arc;

use cumulo_platform::MultiTenantApp;
use cumulo_tenancy::TenantRegistry;

/// State shared by every route handler.
///
/// Handlers are stateless beyond this: the registry for reads, the app for
/// resolving tenant/user-scoped clients per request.
pub struct AppState {
    /// Tenant context resolver.
    pub app: Arc<MultiTenantApp>,
    /// Subscribed-tenant registry, written by the subscription listener.
    pub registry: TenantRegistry,
}

impl AppState {
    /// Bundle the resolver and registry.
    pub fn new(app: Arc<MultiTenantApp>, registry: TenantRegistry) -> Self {
        Self { app, registry }
    }

    /// Registry snapshot, sorted for stable JSON output.
    pub fn subscribers(&self) -> Vec<String> {
        let mut subscribers: Vec<String> = self.registry.snapshot().into_iter().collect();
        subscribers.sort();
        subscribers
    }
}
