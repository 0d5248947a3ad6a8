//! # Library API
//!
//! REST server for authors and their books.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Library API Routes                              │
//! │                                                                         │
//! │  ┌──────────────────────────────┐  ┌──────────────────────────────────┐│
//! │  │  /authors                    │  │  /books                          ││
//! │  │                              │  │                                  ││
//! │  │ • GET     list               │  │ • GET     list                   ││
//! │  │ • POST    create             │  │ • POST    create                 ││
//! │  │ • GET     /{id}              │  │ • GET     /search?title=         ││
//! │  │ • PUT     /{id}              │  │ • GET     /{id}                  ││
//! │  │ • DELETE  /{id}              │  │ • PUT     /{id}                  ││
//! │  │                              │  │ • DELETE  /{id}                  ││
//! │  └──────────────────────────────┘  └──────────────────────────────────┘│
//! │                                                                         │
//! │  Success: {status, data}      Failure: {status, message[, errors]}     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `LIBRARY_HOST` - bind host (default: 0.0.0.0)
//! - `LIBRARY_PORT` - HTTP port (default: 8000)
//! - `DATABASE_PATH` - SQLite file (default: ./library.db)
//! - `DB_MAX_CONNECTIONS` - pool size (default: 5)
//! - `RUN_MIGRATIONS` - apply migrations at startup (default: true)

pub mod config;
pub mod error;
pub mod routes;

use axum::Router;
use library_db::Database;
use tower_http::trace::TraceLayer;

// Re-exports
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
}

/// Builds the application router over `db`.
pub fn build_router(db: Database) -> Router {
    routes::router()
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { db })
}
