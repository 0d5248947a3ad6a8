//! # Repository Module
//!
//! Database repository implementations for authors and books.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Service                                                               │
//! │       │                                                                 │
//! │       │  db.books().find_active(7)                                     │
//! │       ▼                                                                 │
//! │  BookRepository                                                        │
//! │  ├── list_active / find_active / search_title                          │
//! │  ├── isbn_taken(isbn, ignore_id)                                       │
//! │  ├── insert / update (author guard inside the statement)              │
//! │  └── soft_delete                                                       │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Every read path filters `deleted_at IS NULL`. Uniqueness lookups      │
//! │  scan the whole table, matching the UNIQUE constraints.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`author::AuthorRepository`] - Author CRUD and email lookups
//! - [`book::BookRepository`] - Book CRUD, ISBN lookups, title search

pub mod author;
pub mod book;
