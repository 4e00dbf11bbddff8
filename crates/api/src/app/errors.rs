use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use crate::app::services::CatalogError;

impl IntoResponse for CatalogError {
    fn into_response(self) -> axum::response::Response {
        match self {
            CatalogError::NotFound(_) => json_error(StatusCode::NOT_FOUND, "not_found", self.to_string()),
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Fallback for unknown routes.
pub async fn not_found() -> axum::response::Response {
    json_error(StatusCode::NOT_FOUND, "not_found", "no such route")
}
