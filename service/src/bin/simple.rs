//! Single-tenant microservice entry point.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use cumulo_platform::env::{load_env_file, platform_vars};
use cumulo_platform::SimpleApp;
use cumulo_service::config::{ServiceConfig, ENV_FILE};
use cumulo_service::simple::{build_simple_router, start_device_sweep, SimpleState};

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
    let app = SimpleApp::from_env()?;

    let descriptor = app.client().descriptor().await?;
    tracing::info!(
        tenant = %descriptor.tenant_id,
        user = %descriptor.username,
        "connected to platform"
    );

    let sweep = start_device_sweep(app.client(), config.process_interval);

    let state = Arc::new(SimpleState { app });
    let router = build_simple_router(state);

    let bind_addr = config.bind_addr();
    let tcp = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("listening on {bind_addr}");
    axum::serve(tcp, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweep.shutdown(Some(Duration::from_secs(30))).await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("cannot listen for shutdown signal: {err}");
    }
    tracing::info!("shutting down");
}
