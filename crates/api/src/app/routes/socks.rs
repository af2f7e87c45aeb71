use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Extension, Multipart, OriginalUri, Path, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use tracing::warn;

use sockstock_core::StockId;
use sockstock_inventory::FilterCriteria;

use crate::app::dto::SocksDto;
use crate::app::errors;
use crate::app::services::AppServices;

/// Multipart field carrying the batch upload.
const BATCH_FIELD: &str = "file";

pub fn router() -> Router {
    Router::new()
        .route("/", get(aggregate))
        .route("/income", post(income))
        .route("/outcome", post(outcome))
        .route("/batch", post(batch_income))
        .route("/:id", put(update))
}

/// Decode and validate a JSON body, or produce the 400 response.
fn validated(
    body: Result<Json<SocksDto>, JsonRejection>,
    path: &str,
) -> Result<SocksDto, axum::response::Response> {
    let Json(dto) = body.map_err(|e| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", e.body_text(), path)
    })?;
    dto.validate().map_err(errors::validation_error)?;
    Ok(dto)
}

pub async fn income(
    Extension(services): Extension<Arc<AppServices>>,
    OriginalUri(uri): OriginalUri,
    body: Result<Json<SocksDto>, JsonRejection>,
) -> axum::response::Response {
    let dto = match validated(body, uri.path()) {
        Ok(dto) => dto,
        Err(resp) => return resp,
    };
    match services.ledger.income(dto.to_input()).await {
        Ok(record) => (StatusCode::OK, Json(SocksDto::from_record(&record))).into_response(),
        Err(e) => errors::stock_error_to_response(e, uri.path()),
    }
}

pub async fn outcome(
    Extension(services): Extension<Arc<AppServices>>,
    OriginalUri(uri): OriginalUri,
    body: Result<Json<SocksDto>, JsonRejection>,
) -> axum::response::Response {
    let dto = match validated(body, uri.path()) {
        Ok(dto) => dto,
        Err(resp) => return resp,
    };
    match services.ledger.outcome(dto.to_input()).await {
        Ok(record) => (StatusCode::OK, Json(SocksDto::from_record(&record))).into_response(),
        Err(e) => errors::stock_error_to_response(e, uri.path()),
    }
}

pub async fn update(
    Extension(services): Extension<Arc<AppServices>>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
    body: Result<Json<SocksDto>, JsonRejection>,
) -> axum::response::Response {
    let id: StockId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_id",
                "invalid stock record id",
                uri.path(),
            );
        }
    };
    let dto = match validated(body, uri.path()) {
        Ok(dto) => dto,
        Err(resp) => return resp,
    };
    match services.ledger.update(id, dto.to_input()).await {
        Ok(record) => (StatusCode::OK, Json(SocksDto::from_record(&record))).into_response(),
        Err(e) => errors::stock_error_to_response(e, uri.path()),
    }
}

pub async fn batch_income(
    Extension(services): Extension<Arc<AppServices>>,
    OriginalUri(uri): OriginalUri,
    mut multipart: Multipart,
) -> axum::response::Response {
    let mut filename = None;
    let mut contents = Vec::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "malformed multipart upload");
                return errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "invalid_file_format",
                    e.body_text(),
                    uri.path(),
                );
            }
        };
        if field.name() != Some(BATCH_FIELD) {
            continue;
        }
        filename = field.file_name().map(str::to_string);
        match field.bytes().await {
            Ok(bytes) => contents = bytes.to_vec(),
            Err(e) => {
                warn!(error = %e, "failed to read multipart upload");
                return errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "invalid_file_format",
                    e.body_text(),
                    uri.path(),
                );
            }
        }
        break;
    }

    match services
        .ledger
        .batch_income(filename.as_deref(), contents.as_slice())
        .await
    {
        Ok(report) => {
            let items: Vec<SocksDto> = report.records.iter().map(SocksDto::from_record).collect();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::stock_error_to_response(e, uri.path()),
    }
}

pub async fn aggregate(
    Extension(services): Extension<Arc<AppServices>>,
    OriginalUri(uri): OriginalUri,
    criteria: Result<Query<FilterCriteria>, QueryRejection>,
) -> axum::response::Response {
    let Query(criteria) = match criteria {
        Ok(q) => q,
        Err(e) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_query",
                e.body_text(),
                uri.path(),
            );
        }
    };
    match services.ledger.aggregate(&criteria).await {
        Ok(total) => (StatusCode::OK, Json(total)).into_response(),
        Err(e) => errors::stock_error_to_response(e, uri.path()),
    }
}
