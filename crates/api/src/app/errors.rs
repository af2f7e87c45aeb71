use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use serde_json::json;

use sockstock_core::StockError;

use super::dto::FieldErrors;

pub fn stock_error_to_response(err: StockError, path: &str) -> axum::response::Response {
    let status = match &err {
        StockError::NotFound => StatusCode::NOT_FOUND,
        StockError::InsufficientStock { .. }
        | StockError::InvalidFileFormat(_)
        | StockError::InvalidOperator(_)
        | StockError::InvalidQuantity(_) => StatusCode::BAD_REQUEST,
        StockError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!(error = %err, path, "request failed");
    }
    json_error(status, err.code(), err.to_string(), path)
}

/// Transport validation failures: a bare `{field: message}` map.
pub fn validation_error(errors: FieldErrors) -> axum::response::Response {
    (StatusCode::BAD_REQUEST, axum::Json(errors)).into_response()
}

pub fn json_error(
    status: StatusCode,
    code: &str,
    message: impl Into<String>,
    path: &str,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "timestamp": Utc::now().to_rfc3339(),
            "error": status.canonical_reason().unwrap_or("Unknown"),
            "status": status.as_u16(),
            "code": code,
            "message": message.into(),
            "path": path,
        })),
    )
        .into_response()
}
