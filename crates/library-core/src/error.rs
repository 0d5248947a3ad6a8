//! # Error Types
//!
//! Domain-specific error types for library-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  library-core errors (this file)                                       │
//! │  ├── CoreError         - NotFound / Validation / BadRequest            │
//! │  └── ValidationErrors  - Ordered list of FieldError                    │
//! │                                                                         │
//! │  library-db errors (separate crate)                                    │
//! │  ├── DbError           - Database operation failures                   │
//! │  └── ServiceError      - CoreError | DbError                           │
//! │                                                                         │
//! │  API errors (in app)                                                   │
//! │  └── ApiError          - Status code + envelope                        │
//! │                                                                         │
//! │  Flow: FieldError → CoreError → ServiceError → ApiError → HTTP         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (entity, id, field)
//! 3. At most one error per field: the first failing rule wins

use std::fmt;

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Domain errors surfaced by the author and book services.
///
/// None of these are transient: retrying the same request yields the same
/// failure.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    /// The addressed record does not exist or is soft-deleted.
    ///
    /// ## When This Occurs
    /// - `get`, `update` or `delete` with an unknown id
    /// - The id is not an integer
    /// - The record carries a `deleted_at` marker
    /// - A search matched nothing
    #[error("{entity} not found")]
    NotFound { entity: String, id: String },

    /// One or more fields failed their rules.
    #[error("{0}")]
    Validation(ValidationErrors),

    /// A required query parameter is missing or the body is malformed.
    #[error("{0}")]
    BadRequest(String),
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }
}

impl From<ValidationErrors> for CoreError {
    fn from(errors: ValidationErrors) -> Self {
        CoreError::Validation(errors)
    }
}

// =============================================================================
// Field Errors
// =============================================================================

/// Why a single field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldErrorKind {
    /// Field is required but absent, null or blank.
    RequiredMissing,
    /// Field is present but has the wrong type, syntax or length.
    FormatInvalid,
    /// Another record already holds this value.
    NotUnique,
    /// The referenced record does not exist or is soft-deleted.
    NotFoundReference,
}

/// A rejected field with a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub kind: FieldErrorKind,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, kind: FieldErrorKind, message: impl Into<String>) -> Self {
        FieldError {
            field: field.into(),
            kind,
            message: message.into(),
        }
    }
}

/// Ordered collection of field errors produced by one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        ValidationErrors(Vec::new())
    }

    /// Records an error unless the field already has one.
    pub fn push(&mut self, error: FieldError) {
        if !self.has(&error.field) {
            self.0.push(error);
        }
    }

    /// Shorthand for `push(FieldError::new(..))`.
    pub fn add(&mut self, field: &str, kind: FieldErrorKind, message: impl Into<String>) {
        self.push(FieldError::new(field, kind, message));
    }

    /// Returns true if `field` already failed a rule.
    pub fn has(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    pub fn get(&self, field: &str) -> Option<&FieldError> {
        self.0.iter().find(|e| e.field == field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// `Ok(())` when no field failed, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// Summary line: the first message, plus a count of the rest.
    ///
    /// ```text
    /// "Please enter name. (and 1 more error)"
    /// ```
    pub fn summary(&self) -> String {
        let Some(first) = self.0.first() else {
            return "The given data was invalid.".to_string();
        };

        match self.0.len() - 1 {
            0 => first.message.clone(),
            1 => format!("{} (and 1 more error)", first.message),
            n => format!("{} (and {} more errors)", first.message, n),
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

impl From<FieldError> for ValidationErrors {
    fn from(error: FieldError) -> Self {
        ValidationErrors(vec![error])
    }
}

impl IntoIterator for ValidationErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
