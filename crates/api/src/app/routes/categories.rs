use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use souvenir_catalog::ListingParams;

use crate::app::dto;
use crate::app::services::CatalogService;

pub fn router() -> Router {
    Router::new()
        .route("/", get(category_tree))
        .route("/:slug", get(category_page))
}

pub async fn category_tree(Extension(services): Extension<Arc<CatalogService>>) -> axum::response::Response {
    let items = services.category_tree().await;
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}

pub async fn category_page(
    Extension(services): Extension<Arc<CatalogService>>,
    Path(slug): Path<String>,
    Query(pairs): Query<dto::QueryPairs>,
) -> axum::response::Response {
    let params = ListingParams::from_pairs(pairs);
    match services.category_page(&slug, &params).await {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(e) => e.into_response(),
    }
}
