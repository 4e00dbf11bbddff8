use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use souvenir_catalog::{Audience, ListingParams};

use crate::app::dto;
use crate::app::services::CatalogService;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products))
        .route("/:slug", get(get_product))
        .route("/:slug/quote", get(quote_product))
}

pub async fn list_products(
    Extension(services): Extension<Arc<CatalogService>>,
    Query(pairs): Query<dto::QueryPairs>,
) -> axum::response::Response {
    let params = ListingParams::from_pairs(pairs);
    let page = services.list_products(&params, Audience::Public).await;
    (StatusCode::OK, Json(page)).into_response()
}

pub async fn get_product(
    Extension(services): Extension<Arc<CatalogService>>,
    Path(slug): Path<String>,
) -> axum::response::Response {
    match services.product_detail(&slug).await {
        Ok(product) => (StatusCode::OK, Json(product)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn quote_product(
    Extension(services): Extension<Arc<CatalogService>>,
    Path(slug): Path<String>,
    Query(pairs): Query<dto::QueryPairs>,
) -> axum::response::Response {
    let quantity = dto::QuoteQuery::from_pairs(&pairs).quantity();
    match services.price_quote(&slug, quantity).await {
        Ok(quote) => (StatusCode::OK, Json(quote)).into_response(),
        Err(e) => e.into_response(),
    }
}
