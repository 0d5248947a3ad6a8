//! # Book Service
//!
//! Field rules, ISBN uniqueness, the write-time author reference check and
//! title search on top of [`BookRepository`].

use library_core::validation::{book_rules, messages, BookInput, Checked, Fields, RuleMode};
use library_core::{Book, CoreError, FieldErrorKind};
use tracing::{debug, info, warn};

use crate::error::{DbError, ServiceError, ServiceResult};
use crate::repository::author::AuthorRepository;
use crate::repository::book::BookRepository;
use crate::service::{field_failure, not_found_or_db};

const ENTITY: &str = "Book";

/// Book operations exposed to the HTTP layer.
#[derive(Debug, Clone)]
pub struct BookService {
    books: BookRepository,
    authors: AuthorRepository,
}

impl BookService {
    pub fn new(books: BookRepository, authors: AuthorRepository) -> Self {
        BookService { books, authors }
    }

    /// All live books, whether or not their author is still live.
    pub async fn list(&self) -> ServiceResult<Vec<Book>> {
        Ok(self.books.list_active().await?)
    }

    /// Validates `fields` against the create rules and inserts the book.
    ///
    /// ## Errors
    /// * `Validation` - a missing or malformed field, an ISBN held by any
    ///   book row, or an `author_id` that is not a live author
    pub async fn create(&self, fields: &Fields) -> ServiceResult<Book> {
        let mut checked = book_rules(RuleMode::Create, fields);
        self.storage_rules(&mut checked, None).await?;

        checked.errors.into_result()?;
        let new = checked
            .input
            .into_new()
            .ok_or_else(|| DbError::Internal("book input incomplete after validation".into()))?;

        let id = self.books.insert(&new).await.map_err(write_conflict)?;
        info!(id, isbn = %new.isbn, author_id = new.author_id, "Book created");

        self.fetch(id).await
    }

    /// Returns a live book.
    pub async fn get(&self, id: i64) -> ServiceResult<Book> {
        self.fetch(id).await
    }

    /// Applies the supplied fields to a live book.
    ///
    /// A body with no book fields changes nothing.
    pub async fn update(&self, id: i64, fields: &Fields) -> ServiceResult<Book> {
        let existing = self.fetch(id).await?;

        let mode = RuleMode::Update { id };
        let mut checked = book_rules(mode, fields);
        self.storage_rules(&mut checked, mode.ignore_id()).await?;

        checked.errors.into_result()?;
        let changes = checked.input.into_changes();

        if changes.is_empty() {
            return Ok(existing);
        }

        if let Err(e) = self.books.update(id, &changes).await {
            return Err(match e {
                e @ DbError::NotFound { .. } => not_found_or_db(e),
                e => write_conflict(e),
            });
        }
        info!(id, "Book updated");

        self.fetch(id).await
    }

    /// Soft-deletes a live book.
    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        self.books.soft_delete(id).await.map_err(not_found_or_db)?;
        info!(id, "Book deleted");
        Ok(())
    }

    /// Live books whose title contains `title`.
    ///
    /// ## Errors
    /// * `BadRequest` - `title` absent or blank
    /// * `NotFound` - nothing matched
    pub async fn search(&self, title: Option<&str>) -> ServiceResult<Vec<Book>> {
        let needle = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| CoreError::BadRequest("Title parameter is required".to_string()))?;

        let books = self.books.search_title(needle).await?;
        if books.is_empty() {
            debug!(needle = %needle, "Search matched nothing");
            return Err(CoreError::not_found(ENTITY, needle).into());
        }

        Ok(books)
    }

    /// Appends the rules that need the store: ISBN unique (ignoring
    /// `ignore_id`) and author live. Fields that already failed are skipped.
    async fn storage_rules(
        &self,
        checked: &mut Checked<BookInput>,
        ignore_id: Option<i64>,
    ) -> ServiceResult<()> {
        if let Some(isbn) = checked.input.isbn.as_deref() {
            if self.books.isbn_taken(isbn, ignore_id).await? {
                checked
                    .errors
                    .add("isbn", FieldErrorKind::NotUnique, messages::ISBN_TAKEN);
            }
        }

        if let Some(author_id) = checked.input.author_id {
            if !self.authors.exists_active(author_id).await? {
                checked.errors.add(
                    "author_id",
                    FieldErrorKind::NotFoundReference,
                    messages::AUTHOR_MISSING,
                );
            }
        }

        Ok(())
    }

    async fn fetch(&self, id: i64) -> ServiceResult<Book> {
        self.books
            .find_active(id)
            .await?
            .ok_or_else(|| CoreError::not_found(ENTITY, id).into())
    }
}

/// Failures raised by the write statement itself, after the pre-checks
/// passed: a concurrent ISBN insert, or the author deleted in between.
fn write_conflict(err: DbError) -> ServiceError {
    match err {
        e if e.is_unique_violation_on("books.isbn") => {
            warn!("ISBN uniqueness enforced by constraint");
            field_failure("isbn", FieldErrorKind::NotUnique, messages::ISBN_TAKEN)
        }
        DbError::ForeignKeyViolation { message } => {
            warn!(%message, "Author reference rejected at write time");
            field_failure(
                "author_id",
                FieldErrorKind::NotFoundReference,
                messages::AUTHOR_MISSING,
            )
        }
        e => e.into(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use library_core::ValidationErrors;
    use serde_json::{json, Value};

    fn fields(value: Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    fn book_body(title: &str, isbn: &str, author_id: i64) -> Fields {
        fields(json!({
            "title": title,
            "isbn": isbn,
            "published_date": "2002-08-26",
            "author_id": author_id
        }))
    }

    fn validation(err: ServiceError) -> ValidationErrors {
        match err {
            ServiceError::Domain(CoreError::Validation(errors)) => errors,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    async fn add_book(svc: &BookService, title: &str, isbn: &str, author_id: i64) -> Book {
        let body = book_body(title, isbn, author_id);
        svc.create(&body).await.unwrap()
    }

    async fn setup() -> (Database, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let author = db
            .author_service()
            .create(&fields(json!({ "name": "Ahmed Elragal", "email": "ahmed@gmail.com" })))
            .await
            .unwrap();
        (db, author.id)
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let (db, author_id) = setup().await;
        let svc = db.book_service();

        let book = add_book(&svc, "Book 1", "332", author_id).await;

        assert_eq!(svc.get(book.id).await.unwrap(), book);
        assert_eq!(svc.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_missing_or_deleted_author() {
        let (db, author_id) = setup().await;
        let svc = db.book_service();

        let errors = validation(
            svc.create(&book_body("Book 1", "332", 999))
                .await
                .unwrap_err(),
        );
        assert_eq!(
            errors.get("author_id").unwrap().kind,
            FieldErrorKind::NotFoundReference
        );

        db.author_service().delete(author_id).await.unwrap();
        let errors = validation(
            svc.create(&book_body("Book 1", "332", author_id))
                .await
                .unwrap_err(),
        );
        assert_eq!(
            errors.get("author_id").unwrap().message,
            messages::AUTHOR_MISSING
        );
        assert!(svc.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_collects_rule_and_storage_errors() {
        let (db, author_id) = setup().await;
        let svc = db.book_service();
        add_book(&svc, "Book 1", "332", author_id).await;

        let errors = validation(
            svc.create(&fields(json!({
                "title": "",
                "isbn": "332",
                "published_date": "2002-02-30",
                "author_id": 999
            })))
            .await
            .unwrap_err(),
        );

        assert_eq!(errors.len(), 4);
        assert_eq!(
            errors.get("title").unwrap().kind,
            FieldErrorKind::RequiredMissing
        );
        assert_eq!(errors.get("isbn").unwrap().kind, FieldErrorKind::NotUnique);
        assert_eq!(
            errors.get("published_date").unwrap().kind,
            FieldErrorKind::FormatInvalid
        );
        assert_eq!(
            errors.get("author_id").unwrap().kind,
            FieldErrorKind::NotFoundReference
        );
    }

    #[tokio::test]
    async fn test_update_partial_and_own_isbn() {
        let (db, author_id) = setup().await;
        let svc = db.book_service();
        let book = add_book(&svc, "Book 1", "332", author_id).await;

        let body = fields(json!({ "title": "Book One", "isbn": "332" }));
        let updated = svc.update(book.id, &body).await.unwrap();

        assert_eq!(updated.title, "Book One");
        assert_eq!(updated.isbn, "332");
        assert_eq!(updated.published_date, book.published_date);
        assert_eq!(updated.author_id, author_id);
    }

    #[tokio::test]
    async fn test_update_rejects_taken_isbn_and_deleted_author() {
        let (db, author_id) = setup().await;
        let svc = db.book_service();
        add_book(&svc, "Book 1", "332", author_id).await;
        let second = add_book(&svc, "Book 2", "268", author_id).await;

        let other = db
            .author_service()
            .create(&fields(json!({ "name": "Omar", "email": "omar@gmail.com" })))
            .await
            .unwrap();
        db.author_service().delete(other.id).await.unwrap();

        let errors = validation(
            svc.update(
                second.id,
                &fields(json!({ "isbn": "332", "author_id": other.id })),
            )
            .await
            .unwrap_err(),
        );

        assert_eq!(errors.get("isbn").unwrap().kind, FieldErrorKind::NotUnique);
        assert_eq!(
            errors.get("author_id").unwrap().kind,
            FieldErrorKind::NotFoundReference
        );
        assert_eq!(svc.get(second.id).await.unwrap(), second);
    }

    #[tokio::test]
    async fn test_empty_update_is_noop() {
        let (db, author_id) = setup().await;
        let svc = db.book_service();
        let book = add_book(&svc, "Book 1", "332", author_id).await;

        let same = svc
            .update(book.id, &fields(json!({ "unknown": true })))
            .await
            .unwrap();
        assert_eq!(same, book);
    }

    #[tokio::test]
    async fn test_books_survive_author_delete() {
        let (db, author_id) = setup().await;
        let svc = db.book_service();
        let book = add_book(&svc, "Book 1", "332", author_id).await;

        db.author_service().delete(author_id).await.unwrap();

        assert_eq!(svc.get(book.id).await.unwrap(), book);
        assert_eq!(svc.list().await.unwrap(), vec![book]);
    }

    #[tokio::test]
    async fn test_deleted_book_is_gone() {
        let (db, author_id) = setup().await;
        let svc = db.book_service();
        let book = add_book(&svc, "Book 1", "332", author_id).await;

        svc.delete(book.id).await.unwrap();

        assert!(svc.list().await.unwrap().is_empty());
        for err in [
            svc.get(book.id).await.unwrap_err(),
            svc.update(book.id, &fields(json!({ "title": "X" })))
                .await
                .unwrap_err(),
            svc.delete(book.id).await.unwrap_err(),
        ] {
            assert!(matches!(err.as_domain(), Some(CoreError::NotFound { .. })));
        }
    }

    #[tokio::test]
    async fn test_search() {
        let (db, author_id) = setup().await;
        let svc = db.book_service();
        for (i, isbn) in ["332", "268", "538", "324", "978"].iter().enumerate() {
            add_book(&svc, &format!("Book {}", i + 1), isbn, author_id).await;
        }

        assert_eq!(svc.search(Some("Book")).await.unwrap().len(), 5);
        assert_eq!(svc.search(Some("Book 3")).await.unwrap()[0].isbn, "538");

        let err = svc.search(Some("zzz")).await.unwrap_err();
        assert!(matches!(err.as_domain(), Some(CoreError::NotFound { .. })));

        for missing in [None, Some(""), Some("   ")] {
            let err = svc.search(missing).await.unwrap_err();
            assert!(matches!(err.as_domain(), Some(CoreError::BadRequest(_))));
        }
    }

    #[test]
    fn test_write_conflict_translation() {
        let errors = validation(write_conflict(DbError::duplicate("books.isbn", "332")));
        assert_eq!(errors.get("isbn").unwrap().message, messages::ISBN_TAKEN);

        let errors = validation(write_conflict(DbError::ForeignKeyViolation {
            message: "author 9 does not exist or is deleted".to_string(),
        }));
        assert_eq!(
            errors.get("author_id").unwrap().kind,
            FieldErrorKind::NotFoundReference
        );

        assert!(write_conflict(DbError::PoolExhausted).as_domain().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_same_isbn_one_wins() {
        let dir = tempfile::tempdir().unwrap();
        let config = DbConfig::new(dir.path().join("library.db")).max_connections(4);
        let db = Database::new(config).await.unwrap();
        let author = db
            .author_service()
            .create(&fields(json!({ "name": "Omar", "email": "omar@gmail.com" })))
            .await
            .unwrap();

        let spawn_create = |title: &'static str| {
            let svc = db.book_service();
            let body = book_body(title, "978", author.id);
            tokio::spawn(async move { svc.create(&body).await })
        };
        let a = spawn_create("Book A");
        let b = spawn_create("Book B");

        let results = [a.await.unwrap(), b.await.unwrap()];
        let wins = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(wins, 1);

        let loser = results.into_iter().find_map(Result::err).unwrap();
        let errors = validation(loser);
        assert_eq!(errors.get("isbn").unwrap().kind, FieldErrorKind::NotUnique);
        assert_eq!(db.books().count().await.unwrap(), 1);
    }
}
