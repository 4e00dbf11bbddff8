//! Back-office catalog views. Authentication is enforced upstream.

use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use souvenir_catalog::{Audience, ListingParams};

use crate::app::dto;
use crate::app::services::CatalogService;

pub fn router() -> Router {
    Router::new().route("/products", get(list_products))
}

pub async fn list_products(
    Extension(services): Extension<Arc<CatalogService>>,
    Query(pairs): Query<dto::QueryPairs>,
) -> axum::response::Response {
    let params = ListingParams::from_pairs(pairs);
    let page = services.list_products(&params, Audience::Admin).await;
    (StatusCode::OK, Json(page)).into_response()
}
