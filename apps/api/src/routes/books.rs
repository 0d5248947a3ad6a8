//! `/books` handlers.
//!
//! `/books/search` is a static segment, so it takes precedence over
//! `/books/{id}`.

use axum::body::Bytes;
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use tracing::debug;

use super::{message, parse_fields, record_id, success};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

const ENTITY: &str = "Book";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/books", get(index).post(store))
        .route("/books/search", get(search))
        .route("/books/{id}", get(show).put(update).delete(destroy))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub title: Option<String>,
}

async fn index(State(state): State<AppState>) -> ApiResult<Response> {
    let books = state.db.book_service().list().await?;
    Ok(success(StatusCode::OK, books))
}

async fn store(State(state): State<AppState>, body: Bytes) -> ApiResult<Response> {
    let fields = parse_fields(&body)?;
    state.db.book_service().create(&fields).await?;
    Ok(message(StatusCode::CREATED, "Book created successfully"))
}

async fn search(
    State(state): State<AppState>,
    query: Result<Query<SearchParams>, QueryRejection>,
) -> ApiResult<Response> {
    let Query(params) = query.map_err(|rejection| {
        debug!(%rejection, "Unusable search query");
        ApiError::BadRequest(rejection.body_text())
    })?;

    let books = state
        .db
        .book_service()
        .search(params.title.as_deref())
        .await?;
    Ok(success(StatusCode::OK, books))
}

async fn show(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Response> {
    let id = record_id(ENTITY, path)?;
    let book = state.db.book_service().get(id).await?;
    Ok(success(StatusCode::OK, book))
}

async fn update(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    body: Bytes,
) -> ApiResult<Response> {
    let id = record_id(ENTITY, path)?;
    let fields = parse_fields(&body)?;
    state.db.book_service().update(id, &fields).await?;
    Ok(message(StatusCode::OK, "Book updated successfully"))
}

async fn destroy(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Response> {
    let id = record_id(ENTITY, path)?;
    state.db.book_service().delete(id).await?;
    Ok(message(StatusCode::OK, "Book deleted successfully"))
}
