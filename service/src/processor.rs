//! Background per-tenant maintenance sweep.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use cumulo_platform::{MultiTenantApp, PlatformError};
use cumulo_tenancy::{ListenerHandle, TenantRegistry};

/// Run one sweep: visit every tenant in the current registry snapshot and
/// log its device count. Returns `(processed, failed)`.
///
/// A failure on one tenant is logged and never aborts the remaining
/// tenants of the same tick.
pub async fn sweep_once(app: &MultiTenantApp, registry: &TenantRegistry) -> (usize, usize) {
    let mut snapshot: Vec<String> = registry.snapshot().into_iter().collect();
    snapshot.sort();

    let mut processed = 0;
    let mut failed = 0;
    for tenant in snapshot {
        tracing::info!("processing tenant '{tenant}'");
        match count_devices(app, &tenant).await {
            Ok(count) => {
                tracing::info!("tenant '{tenant}' devices: {count}");
                processed += 1;
            }
            Err(err) => {
                tracing::warn!("processing tenant '{tenant}' failed: {err}");
                failed += 1;
            }
        }
    }
    (processed, failed)
}

async fn count_devices(app: &MultiTenantApp, tenant: &str) -> Result<u64, PlatformError> {
    let client = app.tenant_instance(tenant).await?;
    client.device_count().await
}

/// Spawn the sweep loop. The first sweep runs one full interval after
/// start; stop is honored between ticks, never mid-sweep.
pub fn start_sweep(
    app: Arc<MultiTenantApp>,
    registry: TenantRegistry,
    interval: Duration,
) -> ListenerHandle {
    let (stop_tx, mut stop_rx) = watch::channel(false);
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        ticker.tick().await; // immediate first tick

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = stop_rx.changed() => break,
            }
            sweep_once(&app, &registry).await;
        }
        tracing::info!("background sweep stopped");
    });
    ListenerHandle::from_parts(stop_tx, task)
}
