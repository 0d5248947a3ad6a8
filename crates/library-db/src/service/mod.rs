//! # Service Module
//!
//! Validated CRUD over authors and books.
//!
//! ## Request Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    BookService::update(id, fields)                      │
//! │                                                                         │
//! │  1. find_active(id)            ── None ──► CoreError::NotFound          │
//! │       │                                                                 │
//! │  2. book_rules(Update{id})     ── field errors collected                │
//! │       │                                                                 │
//! │  3. storage rules              ── isbn_taken(.., ignore id)             │
//! │       │                           author exists_active                  │
//! │       │                                                                 │
//! │  4. errors non-empty?          ── yes ──► CoreError::Validation         │
//! │       │                                                                 │
//! │  5. repository write           ── UniqueViolation ──► not_unique        │
//! │       │                           ForeignKeyViolation ──► not_found_ref │
//! │       ▼                                                                 │
//! │  Ok(updated record)                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Step 3 gives friendly errors in the common case. Step 5 is what holds
//! under concurrent writers: the UNIQUE constraints and the author guard
//! live in the write statements themselves.

pub mod audit;
pub mod author;
pub mod book;

use library_core::validation::parse_id;
use library_core::{CoreError, FieldErrorKind, ValidationErrors};
use serde_json::Value;

use crate::error::{DbError, ServiceError};

/// Parses a record id taken from a URL path.
///
/// Anything that is not an integer cannot name a record, so it is reported
/// as `NotFound` for `entity`.
pub fn parse_record_id(entity: &str, raw: &str) -> Result<i64, CoreError> {
    parse_id(&Value::String(raw.to_string())).ok_or_else(|| CoreError::not_found(entity, raw))
}

/// A single-field validation failure as a service error.
pub(crate) fn field_failure(field: &str, kind: FieldErrorKind, message: &str) -> ServiceError {
    let mut errors = ValidationErrors::new();
    errors.add(field, kind, message);
    errors.into()
}

/// Maps a repository `NotFound` to the domain error; everything else stays
/// a database error.
pub(crate) fn not_found_or_db(err: DbError) -> ServiceError {
    match err {
        DbError::NotFound { entity, id } => CoreError::NotFound { entity, id }.into(),
        other => other.into(),
    }
}
