//! # Book Repository
//!
//! Database operations for books.
//!
//! ## Write-Time Author Guard
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 How the author reference is enforced                    │
//! │                                                                         │
//! │  INSERT INTO books (...)                                               │
//! │  SELECT ?title, ?isbn, ?date, ?author_id, ...                          │
//! │  WHERE EXISTS (SELECT 1 FROM authors                                   │
//! │                WHERE id = ?author_id AND deleted_at IS NULL)           │
//! │       │                                                                 │
//! │       ├── 1 row  → inserted, author was live at that instant           │
//! │       └── 0 rows → DbError::ForeignKeyViolation                        │
//! │                                                                         │
//! │  The check and the write are one statement, so an author deleted       │
//! │  between the service pre-check and the insert cannot slip through.     │
//! │  Deleting the author afterwards is allowed: the reference dangles.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use library_core::{Book, BookChanges, NewBook};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};

const BOOK_COLUMNS: &str =
    "id, title, isbn, published_date, author_id, created_at, updated_at, deleted_at";

/// Repository for book database operations.
#[derive(Debug, Clone)]
pub struct BookRepository {
    pool: SqlitePool,
}

impl BookRepository {
    /// Creates a new BookRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BookRepository { pool }
    }

    /// Lists live books in table order.
    pub async fn list_active(&self) -> DbResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(&format!(
            "SELECT {} FROM books WHERE deleted_at IS NULL ORDER BY id",
            BOOK_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        debug!(count = books.len(), "Listed books");
        Ok(books)
    }

    /// Gets a live book by ID.
    pub async fn find_active(&self, id: i64) -> DbResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(&format!(
            "SELECT {} FROM books WHERE id = ?1 AND deleted_at IS NULL",
            BOOK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(book)
    }

    /// Lists live books whose title contains `needle`.
    ///
    /// `%` and `_` in the needle match literally. Case folding follows
    /// SQLite's `LIKE` (ASCII case-insensitive).
    pub async fn search_title(&self, needle: &str) -> DbResult<Vec<Book>> {
        debug!(needle = %needle, "Searching books by title");

        let pattern = format!("%{}%", escape_like(needle));

        let books = sqlx::query_as::<_, Book>(&format!(
            r"SELECT {} FROM books
              WHERE deleted_at IS NULL AND title LIKE ?1 ESCAPE '\'
              ORDER BY id",
            BOOK_COLUMNS
        ))
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = books.len(), "Search returned books");
        Ok(books)
    }

    /// True if any book row, deleted or not, holds `isbn`.
    ///
    /// `ignore_id` leaves one record out, for updates.
    pub async fn isbn_taken(&self, isbn: &str, ignore_id: Option<i64>) -> DbResult<bool> {
        let found: Option<i64> = sqlx::query_scalar(
            "SELECT 1 FROM books WHERE isbn = ?1 AND (?2 IS NULL OR id <> ?2) LIMIT 1",
        )
        .bind(isbn)
        .bind(ignore_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(found.is_some())
    }

    /// Inserts a new book if its author is live, and returns its ID.
    ///
    /// ## Errors
    /// * `DbError::UniqueViolation` - `books.isbn` already present
    /// * `DbError::ForeignKeyViolation` - author missing or soft-deleted
    pub async fn insert(&self, book: &NewBook) -> DbResult<i64> {
        debug!(isbn = %book.isbn, author_id = book.author_id, "Inserting book");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO books (title, isbn, published_date, author_id, created_at, updated_at)
            SELECT ?1, ?2, ?3, ?4, ?5, ?5
            WHERE EXISTS (
                SELECT 1 FROM authors WHERE id = ?4 AND deleted_at IS NULL
            )
            "#,
        )
        .bind(&book.title)
        .bind(&book.isbn)
        .bind(book.published_date)
        .bind(book.author_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(author_missing(book.author_id));
        }

        Ok(result.last_insert_rowid())
    }

    /// Applies a partial update to a live book.
    ///
    /// When `author_id` changes, the new author must be live at the moment
    /// of the write.
    ///
    /// ## Returns
    /// * `Ok(())` - Update successful
    /// * `Err(DbError::NotFound)` - Book doesn't exist or is deleted
    /// * `Err(DbError::ForeignKeyViolation)` - New author missing or deleted
    /// * `Err(DbError::UniqueViolation)` - ISBN taken by another row
    pub async fn update(&self, id: i64, changes: &BookChanges) -> DbResult<()> {
        debug!(id, "Updating book");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE books SET
                title = COALESCE(?2, title),
                isbn = COALESCE(?3, isbn),
                published_date = COALESCE(?4, published_date),
                author_id = COALESCE(?5, author_id),
                updated_at = ?6
            WHERE id = ?1
              AND deleted_at IS NULL
              AND (?5 IS NULL OR EXISTS (
                  SELECT 1 FROM authors WHERE id = ?5 AND deleted_at IS NULL
              ))
            "#,
        )
        .bind(id)
        .bind(changes.title.as_deref())
        .bind(changes.isbn.as_deref())
        .bind(changes.published_date)
        .bind(changes.author_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Either the book is gone or the author guard refused the write.
            return match (self.find_active(id).await?, changes.author_id) {
                (Some(_), Some(author_id)) => Err(author_missing(author_id)),
                _ => Err(DbError::not_found("Book", id)),
            };
        }

        Ok(())
    }

    /// Soft-deletes a book by setting `deleted_at`.
    pub async fn soft_delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Soft-deleting book");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE books
            SET deleted_at = ?2, updated_at = ?2
            WHERE id = ?1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Book", id));
        }

        Ok(())
    }

    /// Counts live books (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE deleted_at IS NULL")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

fn author_missing(author_id: i64) -> DbError {
    DbError::ForeignKeyViolation {
        message: format!("author {} does not exist or is deleted", author_id),
    }
}

/// Escapes `LIKE` wildcards so the needle matches literally.
fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

// =============================================================================
// Unit Tests
// =============================================================================
