//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: page assembly over the catalog repository
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request DTOs that are not catalog query parameters
//! - `errors.rs`: consistent JSON error responses

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;

use souvenir_infra::AppConfig;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router from configuration (used by `main.rs`).
pub async fn build_app(config: &AppConfig) -> anyhow::Result<Router> {
    let services = services::build_services(config).await?;
    Ok(router(Arc::new(services)))
}

/// Router over an already-built service (tests inject their own repository).
pub fn router(services: Arc<services::CatalogService>) -> Router {
    routes::router()
        .fallback(errors::not_found)
        .layer(Extension(services))
        .layer(ServiceBuilder::new().layer(axum::middleware::from_fn(middleware::trace_requests)))
}
