//! # Domain Types
//!
//! Records and change sets used throughout the library API.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐  1     *  ┌─────────────────┐                     │
//! │  │     Author      │──────────►│      Book       │                     │
//! │  │  ─────────────  │           │  ─────────────  │                     │
//! │  │  id (i64)       │           │  id (i64)       │                     │
//! │  │  name           │           │  title          │                     │
//! │  │  email (unique) │           │  isbn (unique)  │                     │
//! │  │  deleted_at     │           │  published_date │                     │
//! │  └─────────────────┘           │  author_id (FK) │                     │
//! │                                │  deleted_at     │                     │
//! │                                └─────────────────┘                     │
//! │                                                                         │
//! │  Writes use: NewAuthor / AuthorChanges / NewBook / BookChanges         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Soft Delete
//! `deleted_at = None` means live. Deleted rows stay in storage but are
//! filtered out of every read path.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Author
// =============================================================================

/// A book author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Author {
    /// System-assigned identifier, never changes.
    pub id: i64,

    pub name: String,

    /// Unique across the whole table, soft-deleted rows included.
    pub email: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    /// Soft-delete marker. `Some` = deleted.
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Validated fields for inserting an author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuthor {
    pub name: String,
    pub email: String,
}

/// Partial update of an author. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorChanges {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl AuthorChanges {
    /// True when no field was supplied.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none()
    }
}

// =============================================================================
// Book
// =============================================================================

/// A book written by exactly one author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Book {
    /// System-assigned identifier, never changes.
    pub id: i64,

    pub title: String,

    /// Unique across the whole table, soft-deleted rows included.
    pub isbn: String,

    pub published_date: NaiveDate,

    /// Checked against live authors at write time only. Deleting the author
    /// later leaves this reference dangling.
    pub author_id: i64,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    pub deleted_at: Option<DateTime<Utc>>,
}

/// Validated fields for inserting a book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub isbn: String,
    pub published_date: NaiveDate,
    pub author_id: i64,
}

/// Partial update of a book. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookChanges {
    pub title: Option<String>,
    pub isbn: Option<String>,
    pub published_date: Option<NaiveDate>,
    pub author_id: Option<i64>,
}

impl BookChanges {
    /// True when no field was supplied.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.isbn.is_none()
            && self.published_date.is_none()
            && self.author_id.is_none()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
