//! Microservice skeleton for a multi-tenant IoT platform.
//!
//! Thin by design: route handlers forward into the platform client, a
//! subscription listener keeps the tenant registry in sync and a periodic
//! sweep touches every subscriber's data. Replace the sweep and grow the
//! routes to turn the skeleton into a real service.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod models;
pub mod processor;
pub mod routes;
pub mod simple;
pub mod state;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use state::AppState;

/// OpenAPI documentation for the HTTP surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "cumulo microservice",
        description = "Read-only introspection surface of a multi-tenant microservice skeleton",
        license(name = "Apache-2.0")
    ),
    paths(
        routes::health::health,
        routes::debug::debug_info,
        routes::tenant::tenant_info,
        routes::subscribers::subscriber_info,
        routes::user::user_info,
    ),
    components(schemas(
        models::HealthResponse,
        models::DebugResponse,
        models::TenantInfo,
        models::DeviceInfo,
        models::TenantResponse,
        models::SubscriberInfo,
        models::SubscribersResponse,
        models::UserResponse,
        models::ErrorBody,
    )),
    tags(
        (name = "ops", description = "Health and debugging"),
        (name = "tenancy", description = "Tenant, user and subscriber introspection")
    )
)]
pub struct ApiDoc;

/// Build the multi-tenant HTTP surface.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(routes::health::health))
        .route("/debug", get(routes::debug::debug_info))
        .route("/tenant", get(routes::tenant::tenant_info))
        .route("/subscribers", get(routes::subscribers::subscriber_info))
        .route("/user", get(routes::user::user_info))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
