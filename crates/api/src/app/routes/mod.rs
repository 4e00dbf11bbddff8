use axum::{routing::get, Router};

pub mod admin;
pub mod categories;
pub mod products;
pub mod system;

/// Router for every catalog endpoint.
pub fn router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .nest("/products", products::router())
        .nest("/categories", categories::router())
        .nest("/admin", admin::router())
}
