//! # Author Repository
//!
//! Database operations for authors.
//!
//! ## Key Operations
//! - Live-record reads (`deleted_at IS NULL`)
//! - Email uniqueness lookup over the whole table
//! - Partial update and soft delete as single-row statements

use chrono::Utc;
use library_core::{Author, AuthorChanges, NewAuthor};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};

const AUTHOR_COLUMNS: &str = "id, name, email, created_at, updated_at, deleted_at";

/// Repository for author database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = AuthorRepository::new(pool);
///
/// let id = repo.insert(&new_author).await?;
/// let author = repo.find_active(id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct AuthorRepository {
    pool: SqlitePool,
}

impl AuthorRepository {
    /// Creates a new AuthorRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AuthorRepository { pool }
    }

    /// Lists live authors in table order.
    pub async fn list_active(&self) -> DbResult<Vec<Author>> {
        let authors = sqlx::query_as::<_, Author>(&format!(
            "SELECT {} FROM authors WHERE deleted_at IS NULL ORDER BY id",
            AUTHOR_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        debug!(count = authors.len(), "Listed authors");
        Ok(authors)
    }

    /// Gets a live author by ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Author))` - Author found
    /// * `Ok(None)` - No such author, or soft-deleted
    pub async fn find_active(&self, id: i64) -> DbResult<Option<Author>> {
        let author = sqlx::query_as::<_, Author>(&format!(
            "SELECT {} FROM authors WHERE id = ?1 AND deleted_at IS NULL",
            AUTHOR_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(author)
    }

    /// True if a live author with this ID exists.
    pub async fn exists_active(&self, id: i64) -> DbResult<bool> {
        let found: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM authors WHERE id = ?1 AND deleted_at IS NULL")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(found.is_some())
    }

    /// True if any author row, deleted or not, holds `email`.
    ///
    /// `ignore_id` leaves one record out, for updates.
    pub async fn email_taken(&self, email: &str, ignore_id: Option<i64>) -> DbResult<bool> {
        let found: Option<i64> = sqlx::query_scalar(
            "SELECT 1 FROM authors WHERE email = ?1 AND (?2 IS NULL OR id <> ?2) LIMIT 1",
        )
        .bind(email)
        .bind(ignore_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(found.is_some())
    }

    /// Inserts a new author and returns its ID.
    ///
    /// ## Errors
    /// * `DbError::UniqueViolation` - `authors.email` already present
    pub async fn insert(&self, author: &NewAuthor) -> DbResult<i64> {
        debug!(email = %author.email, "Inserting author");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO authors (name, email, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?3)
            "#,
        )
        .bind(&author.name)
        .bind(&author.email)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Applies a partial update to a live author.
    ///
    /// Fields left `None` keep their stored value.
    ///
    /// ## Returns
    /// * `Ok(())` - Update successful
    /// * `Err(DbError::NotFound)` - Author doesn't exist or is deleted
    /// * `Err(DbError::UniqueViolation)` - Email taken by another row
    pub async fn update(&self, id: i64, changes: &AuthorChanges) -> DbResult<()> {
        debug!(id, "Updating author");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE authors SET
                name = COALESCE(?2, name),
                email = COALESCE(?3, email),
                updated_at = ?4
            WHERE id = ?1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(changes.email.as_deref())
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Author", id));
        }

        Ok(())
    }

    /// Soft-deletes an author by setting `deleted_at`.
    ///
    /// The author's books are left untouched.
    pub async fn soft_delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Soft-deleting author");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE authors
            SET deleted_at = ?2, updated_at = ?2
            WHERE id = ?1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Author", id));
        }

        Ok(())
    }

    /// Counts live authors (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM authors WHERE deleted_at IS NULL")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
