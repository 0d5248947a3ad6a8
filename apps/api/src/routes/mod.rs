//! HTTP routes and the response envelope.

pub mod authors;
pub mod books;

use axum::body::Bytes;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use library_core::validation::Fields;
use library_db::service::parse_record_id;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// All routes, before state is attached.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .merge(authors::router())
        .merge(books::router())
}

#[derive(Serialize)]
struct Envelope<T: Serialize> {
    status: u16,
    data: T,
}

/// `{status, data}` with `status` mirrored in the body.
pub(crate) fn success<T: Serialize>(status: StatusCode, data: T) -> Response {
    (
        status,
        Json(Envelope {
            status: status.as_u16(),
            data,
        }),
    )
        .into_response()
}

/// `{status, data: {message}}`
pub(crate) fn message(status: StatusCode, text: &str) -> Response {
    success(status, json!({ "message": text }))
}

/// Parses a request body into a field mapping.
///
/// An empty body is an empty mapping. Anything other than a JSON object is
/// rejected.
pub(crate) fn parse_fields(body: &Bytes) -> ApiResult<Fields> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Fields::new());
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(_) => Err(ApiError::BadRequest("The request body must be a JSON object".to_string())),
        Err(e) => {
            warn!(error = %e, "Malformed request body");
            Err(ApiError::BadRequest("Malformed JSON body".to_string()))
        }
    }
}

/// Record id from the `{id}` path segment.
///
/// A segment that cannot even be extracted (invalid percent-encoding, bad
/// UTF-8) names no record, the same as a non-integer one.
pub(crate) fn record_id(
    entity: &str,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<i64> {
    let Path(raw) = path.map_err(|rejection| {
        debug!(%rejection, "Unusable record id");
        ApiError::NotFound(format!("{} not found", entity))
    })?;
    Ok(parse_record_id(entity, &raw)?)
}

async fn health(State(state): State<AppState>) -> (StatusCode, &'static str) {
    if state.db.health_check().await {
        (StatusCode::OK, "OK")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "Database unavailable")
    }
}
