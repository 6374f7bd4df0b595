//! Multi-tenant microservice entry point.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use cumulo_platform::env::{load_env_file, platform_vars};
use cumulo_platform::MultiTenantApp;
use cumulo_service::config::{ServiceConfig, ENV_FILE};
use cumulo_service::processor::start_sweep;
use cumulo_service::{build_router, AppState};
use cumulo_tenancy::{SubscriptionListener, TenantRegistry};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let loaded = load_env_file(ENV_FILE)?;
    if loaded > 0 {
        tracing::info!("loaded {loaded} variables from {ENV_FILE}");
    }
    for var in platform_vars() {
        tracing::debug!("{var}");
    }

    let config = ServiceConfig::from_env()?;
    let app = Arc::new(MultiTenantApp::from_env()?);

    // Fail fast on bad credentials or an unreachable platform.
    let bootstrap_devices = app.bootstrap_client().device_count().await?;
    tracing::info!(
        tenant = %app.bootstrap_tenant(),
        devices = bootstrap_devices,
        "connected to platform"
    );

    let registry = TenantRegistry::default();
    let mut listener =
        SubscriptionListener::new(Arc::clone(&app)).with_interval(config.poll_interval);
    {
        // Whole-diff apply: readers never see a poll's removals without
        // its additions.
        let registry = registry.clone();
        listener.on_diff(true, move |diff| {
            registry.apply(diff);
            for tenant in &diff.removed {
                tracing::info!("tenant '{tenant}' removed");
            }
            for tenant in &diff.added {
                tracing::info!("tenant '{tenant}' added");
            }
        });
    }
    let listener = listener.start().await?;
    let sweep = start_sweep(Arc::clone(&app), registry.clone(), config.process_interval);

    let state = Arc::new(AppState::new(app, registry));
    let router = build_router(state);

    let bind_addr = config.bind_addr();
    let tcp = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("listening on {bind_addr}");
    axum::serve(tcp, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    listener.shutdown(None).await;
    sweep.shutdown(Some(Duration::from_secs(30))).await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("cannot listen for shutdown signal: {err}");
    }
    tracing::info!("shutting down");
}
