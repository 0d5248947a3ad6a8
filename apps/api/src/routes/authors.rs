//! `/authors` handlers.

use axum::body::Bytes;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::get;
use axum::Router;

use super::{message, parse_fields, record_id, success};
use crate::error::ApiResult;
use crate::AppState;

const ENTITY: &str = "Author";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/authors", get(index).post(store))
        .route("/authors/{id}", get(show).put(update).delete(destroy))
}

async fn index(State(state): State<AppState>) -> ApiResult<Response> {
    let authors = state.db.author_service().list().await?;
    Ok(success(StatusCode::OK, authors))
}

async fn store(State(state): State<AppState>, body: Bytes) -> ApiResult<Response> {
    let fields = parse_fields(&body)?;
    state.db.author_service().create(&fields).await?;
    Ok(message(StatusCode::CREATED, "Author created successfully"))
}

async fn show(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Response> {
    let id = record_id(ENTITY, path)?;
    let author = state.db.author_service().get(id).await?;
    Ok(success(StatusCode::OK, author))
}

async fn update(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    body: Bytes,
) -> ApiResult<Response> {
    let id = record_id(ENTITY, path)?;
    let fields = parse_fields(&body)?;
    state.db.author_service().update(id, &fields).await?;
    Ok(message(StatusCode::OK, "Author updated successfully"))
}

async fn destroy(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Response> {
    let id = record_id(ENTITY, path)?;
    state.db.author_service().delete(id).await?;
    Ok(message(StatusCode::OK, "Author deleted successfully"))
}
