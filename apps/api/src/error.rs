//! Error types for the Library API.
//!
//! ## Response Mapping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ServiceError                         HTTP                              │
//! │  ─────────────────────────────────    ───────────────────────────────   │
//! │  Domain(NotFound)                 →   404 {status, message}             │
//! │  Domain(BadRequest)               →   400 {status, message}             │
//! │  Domain(Validation)               →   422 {status, message, errors}     │
//! │  Database(_)                      →   500 {status, message}             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use library_core::{CoreError, ValidationErrors};
use library_db::ServiceError;
use serde::Serialize;
use tracing::error;

/// API errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Validation(ValidationErrors),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            CoreError::BadRequest(message) => ApiError::BadRequest(message),
            CoreError::Validation(errors) => ApiError::Validation(errors),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(core) => core.into(),
            ServiceError::Database(db) => ApiError::Internal(db.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    status: u16,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<BTreeMap<String, Vec<String>>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match self {
            ApiError::Validation(errors) => {
                let mut by_field: BTreeMap<String, Vec<String>> = BTreeMap::new();
                for e in errors.iter() {
                    by_field
                        .entry(e.field.clone())
                        .or_default()
                        .push(e.message.clone());
                }
                ErrorBody {
                    status: status.as_u16(),
                    message: errors.summary(),
                    errors: Some(by_field),
                }
            }
            ApiError::Internal(detail) => {
                error!(%detail, "Request failed");
                ErrorBody {
                    status: status.as_u16(),
                    message: "Internal server error".to_string(),
                    errors: None,
                }
            }
            other => ErrorBody {
                status: status.as_u16(),
                message: other.to_string(),
                errors: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Convenience type alias for handler results.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use library_core::FieldErrorKind;
    use library_db::DbError;

    #[test]
    fn test_status_mapping() {
        let cases: Vec<(ApiError, StatusCode)> = vec![
            (
                CoreError::not_found("Book", 1).into(),
                StatusCode::NOT_FOUND,
            ),
            (
                CoreError::BadRequest("Title parameter is required".into()).into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                CoreError::Validation(ValidationErrors::new()).into(),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ServiceError::from(DbError::PoolExhausted).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.status_code(), status);
        }
    }

    #[test]
    fn test_not_found_message() {
        let err: ApiError = ServiceError::from(CoreError::not_found("Author", 7)).into();
        assert_eq!(err.to_string(), "Author not found");
    }

    #[test]
    fn test_validation_keeps_field_errors() {
        let mut errors = ValidationErrors::new();
        errors.add(
            "isbn",
            FieldErrorKind::NotUnique,
            "This ISBN has already been used.",
        );
        let err: ApiError = CoreError::Validation(errors).into();

        match err {
            ApiError::Validation(errors) => assert!(errors.has("isbn")),
            other => panic!("unexpected {other:?}"),
        }
    }
}
