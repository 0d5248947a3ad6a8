//! # library-core: Pure Domain Logic for the Library API
//!
//! This crate holds the records, error taxonomy and field rules of the
//! library API as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Library Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/api (axum)                              │   │
//! │  │    GET/POST /authors ── PUT/DELETE /books/{id} ── /books/search │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ library-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌────────────┐  ┌──────────────────────────┐  │   │
//! │  │   │   types   │  │   error    │  │       validation         │  │   │
//! │  │   │  Author   │  │ CoreError  │  │  author/book rule sets   │  │   │
//! │  │   │  Book     │  │ FieldError │  │  create + update         │  │   │
//! │  │   └───────────┘  └────────────┘  └──────────────────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                library-db (Store + Services)                    │   │
//! │  │         SQLite queries, uniqueness, author reference checks     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Records (Author, Book) and their change sets
//! - [`error`] - Domain error taxonomy and field-level errors
//! - [`validation`] - Per-operation field rules
//!
//! ## Example Usage
//!
//! ```rust
//! use library_core::validation::{author_rules, RuleMode};
//! use serde_json::json;
//!
//! let body = json!({ "name": "Omar Ahmed", "email": "not-an-email" });
//! let checked = author_rules(RuleMode::Create, body.as_object().unwrap());
//!
//! assert!(checked.errors.has("email"));
//! assert_eq!(checked.input.name.as_deref(), Some("Omar Ahmed"));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, FieldError, FieldErrorKind, ValidationErrors};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of a book title, in characters.
pub const MAX_TITLE_LEN: usize = 255;

/// Maximum length of an ISBN, in characters.
///
/// ISBN-13 without separators is the longest accepted form.
pub const MAX_ISBN_LEN: usize = 13;
