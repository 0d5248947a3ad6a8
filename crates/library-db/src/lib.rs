//! # library-db: Entity Store and Services
//!
//! This crate provides database access and the author/book services for the
//! library API. It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Library Data Flow                                │
//! │                                                                         │
//! │  HTTP handler (PUT /books/{id})                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   library-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐   ┌────────────────┐   ┌───────────────┐   │   │
//! │  │   │   Services    │   │  Repositories  │   │   Database    │   │   │
//! │  │   │ (service/)    │   │ (repository/)  │   │   (pool.rs)   │   │   │
//! │  │   │               │   │                │   │               │   │   │
//! │  │   │ AuthorService │──►│ AuthorRepo     │──►│ SqlitePool    │   │   │
//! │  │   │ BookService   │   │ BookRepo       │   │ Migrations    │   │   │
//! │  │   │ AuditSink     │   │                │   │               │   │   │
//! │  │   └───────────────┘   └────────────────┘   └───────────────┘   │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │                       ./library.db                              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database and service error types
//! - [`repository`] - Author and book repositories
//! - [`service`] - Validated CRUD over authors and books
//!
//! ## Usage
//!
//! ```rust,ignore
//! use library_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./library.db")).await?;
//!
//! let authors = db.author_service();
//! authors.create(body.as_object().unwrap()).await?;
//!
//! let books = db.book_service().search(Some("Book")).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, ServiceError, ServiceResult};
pub use pool::{Database, DbConfig};

pub use repository::author::AuthorRepository;
pub use repository::book::BookRepository;
pub use service::audit::{AuditSink, TracingAuditSink};
pub use service::author::AuthorService;
pub use service::book::BookService;
