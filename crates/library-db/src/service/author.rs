//! # Author Service
//!
//! Field rules, email uniqueness and the email-change audit hook on top of
//! [`AuthorRepository`].

use std::sync::Arc;

use library_core::validation::{author_rules, messages, Fields, RuleMode};
use library_core::{Author, CoreError, FieldErrorKind};
use tracing::{info, warn};

use crate::error::{DbError, ServiceError, ServiceResult};
use crate::repository::author::AuthorRepository;
use crate::service::audit::AuditSink;
use crate::service::{field_failure, not_found_or_db};

const ENTITY: &str = "Author";

/// Author operations exposed to the HTTP layer.
#[derive(Debug, Clone)]
pub struct AuthorService {
    repo: AuthorRepository,
    audit: Arc<dyn AuditSink>,
}

impl AuthorService {
    pub fn new(repo: AuthorRepository, audit: Arc<dyn AuditSink>) -> Self {
        AuthorService { repo, audit }
    }

    /// All live authors.
    pub async fn list(&self) -> ServiceResult<Vec<Author>> {
        Ok(self.repo.list_active().await?)
    }

    /// Validates `fields` against the create rules and inserts the author.
    ///
    /// ## Errors
    /// * `Validation` - missing/invalid name or email, or email already used
    ///   by any author row (soft-deleted ones included)
    pub async fn create(&self, fields: &Fields) -> ServiceResult<Author> {
        let mut checked = author_rules(RuleMode::Create, fields);

        if let Some(email) = checked.input.email.as_deref() {
            if self.repo.email_taken(email, None).await? {
                checked
                    .errors
                    .add("email", FieldErrorKind::NotUnique, messages::EMAIL_TAKEN);
            }
        }

        checked.errors.into_result()?;
        let new = checked
            .input
            .into_new()
            .ok_or_else(|| DbError::Internal("author input incomplete after validation".into()))?;

        let id = self.repo.insert(&new).await.map_err(email_conflict)?;
        info!(id, email = %new.email, "Author created");

        self.fetch(id).await
    }

    /// Returns a live author.
    pub async fn get(&self, id: i64) -> ServiceResult<Author> {
        self.fetch(id).await
    }

    /// Applies the supplied fields to a live author.
    ///
    /// Missing records are reported before any field is looked at. A body
    /// with no author fields changes nothing, `updated_at` included.
    pub async fn update(&self, id: i64, fields: &Fields) -> ServiceResult<Author> {
        let existing = self.fetch(id).await?;

        let mode = RuleMode::Update { id };
        let mut checked = author_rules(mode, fields);

        if let Some(email) = checked.input.email.as_deref() {
            if self.repo.email_taken(email, mode.ignore_id()).await? {
                checked
                    .errors
                    .add("email", FieldErrorKind::NotUnique, messages::EMAIL_TAKEN);
            }
        }

        checked.errors.into_result()?;
        let changes = checked.input.into_changes();

        if changes.is_empty() {
            return Ok(existing);
        }

        if let Err(e) = self.repo.update(id, &changes).await {
            return Err(match e {
                e @ DbError::UniqueViolation { .. } => email_conflict(e),
                e => not_found_or_db(e),
            });
        }
        info!(id, "Author updated");

        let updated = self.fetch(id).await?;

        // Recorded under the name the author had before this update.
        if updated.email != existing.email {
            self.audit.email_changed(&existing.name, &updated.email);
        }

        Ok(updated)
    }

    /// Soft-deletes a live author. The author's books are left as they are.
    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        self.repo.soft_delete(id).await.map_err(not_found_or_db)?;
        info!(id, "Author deleted");
        Ok(())
    }

    async fn fetch(&self, id: i64) -> ServiceResult<Author> {
        self.repo
            .find_active(id)
            .await?
            .ok_or_else(|| CoreError::not_found(ENTITY, id).into())
    }
}

/// A lost race on `authors.email` reads the same as a failed pre-check.
fn email_conflict(err: DbError) -> ServiceError {
    if err.is_unique_violation_on("authors.email") {
        warn!("Email uniqueness enforced by constraint");
        return field_failure("email", FieldErrorKind::NotUnique, messages::EMAIL_TAKEN);
    }
    err.into()
}

// =============================================================================
// Unit Tests
// =============================================================================
