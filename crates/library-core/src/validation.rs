//! # Validation Module
//!
//! Field rules for the author and book write operations.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Field rules (THIS MODULE, pure)                              │
//! │  ├── presence (required / sometimes)                                   │
//! │  ├── type (string, integer id)                                         │
//! │  └── format (email syntax, calendar date, max length)                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Storage rules (library-db services)                          │
//! │  ├── email / isbn unique, ignoring the record being updated            │
//! │  └── author_id references a non-deleted author                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── UNIQUE constraints (source of truth under concurrency)            │
//! │  └── author guard inside the write statement                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every rule function returns a [`Checked`] value: the normalized input
//! and the errors found so far. Layer 2 appends to the same error list, so a
//! caller sees all failing fields in one response.
//!
//! ## Usage
//! ```rust
//! use library_core::validation::{book_rules, RuleMode};
//! use serde_json::json;
//!
//! let body = json!({ "title": "Book 6", "published_date": "2024-13-01" });
//! let checked = book_rules(RuleMode::Update { id: 6 }, body.as_object().unwrap());
//!
//! assert!(checked.errors.has("published_date"));
//! assert_eq!(checked.input.title.as_deref(), Some("Book 6"));
//! ```

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate};
use regex::Regex;
use serde_json::{Map, Value};

use crate::error::{FieldErrorKind, ValidationErrors};
use crate::types::{AuthorChanges, BookChanges, NewAuthor, NewBook};
use crate::{MAX_ISBN_LEN, MAX_TITLE_LEN};

/// A raw request body: field name to JSON value.
pub type Fields = Map<String, Value>;

/// Messages shared with the storage-level rules.
pub mod messages {
    pub const EMAIL_TAKEN: &str = "This email has already been used.";
    pub const ISBN_TAKEN: &str = "This ISBN has already been used.";
    pub const AUTHOR_MISSING: &str = "The selected author does not exist or has been deleted.";
}

// =============================================================================
// Rule Mode
// =============================================================================

/// Which rule set applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleMode {
    /// Every field is required.
    Create,
    /// Fields are validated only when present. `id` is the record being
    /// updated, excluded from uniqueness checks.
    Update { id: i64 },
}

impl RuleMode {
    /// The record id to leave out of uniqueness checks.
    pub fn ignore_id(&self) -> Option<i64> {
        match self {
            RuleMode::Create => None,
            RuleMode::Update { id } => Some(*id),
        }
    }

    fn is_create(&self) -> bool {
        matches!(self, RuleMode::Create)
    }
}

/// Normalized input plus the field errors found while producing it.
#[derive(Debug, Clone)]
pub struct Checked<T> {
    pub input: T,
    pub errors: ValidationErrors,
}

// =============================================================================
// Author Rules
// =============================================================================

/// Author fields that passed their field rules. Failed fields are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorInput {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl AuthorInput {
    /// Complete record for insertion, if every field is set.
    pub fn into_new(self) -> Option<NewAuthor> {
        Some(NewAuthor {
            name: self.name?,
            email: self.email?,
        })
    }

    pub fn into_changes(self) -> AuthorChanges {
        AuthorChanges {
            name: self.name,
            email: self.email,
        }
    }
}

/// Applies the author-create or author-update field rules.
///
/// ## Rules
/// - `name`: required (create) / sometimes (update), non-blank string
/// - `email`: same presence, non-blank string, valid email syntax
///
/// Uniqueness of `email` is a storage rule and is not checked here.
pub fn author_rules(mode: RuleMode, fields: &Fields) -> Checked<AuthorInput> {
    let mut errors = ValidationErrors::new();
    let mut input = AuthorInput::default();

    let required = |field: &str, create_msg: &str| -> String {
        if mode.is_create() {
            create_msg.to_string()
        } else {
            default_required(field)
        }
    };

    input.name = string_field(
        mode,
        fields,
        "name",
        &required("name", "Please enter name."),
        &mut errors,
    );

    if let Some(email) = string_field(
        mode,
        fields,
        "email",
        &required("email", "Please enter email."),
        &mut errors,
    ) {
        if is_valid_email(&email) {
            input.email = Some(email);
        } else {
            let msg = if mode.is_create() {
                "Please enter valid email"
            } else {
                "Please enter a valid email."
            };
            errors.add("email", FieldErrorKind::FormatInvalid, msg);
        }
    }

    Checked { input, errors }
}

// =============================================================================
// Book Rules
// =============================================================================

/// Book fields that passed their field rules. Failed fields are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookInput {
    pub title: Option<String>,
    pub isbn: Option<String>,
    pub published_date: Option<NaiveDate>,
    pub author_id: Option<i64>,
}

impl BookInput {
    /// Complete record for insertion, if every field is set.
    pub fn into_new(self) -> Option<NewBook> {
        Some(NewBook {
            title: self.title?,
            isbn: self.isbn?,
            published_date: self.published_date?,
            author_id: self.author_id?,
        })
    }

    pub fn into_changes(self) -> BookChanges {
        BookChanges {
            title: self.title,
            isbn: self.isbn,
            published_date: self.published_date,
            author_id: self.author_id,
        }
    }
}

/// Applies the book-create or book-update field rules.
///
/// ## Rules
/// - `title`: non-blank string, at most 255 characters
/// - `isbn`: non-blank string, at most 13 characters
/// - `published_date`: `YYYY-MM-DD` or an RFC 3339 timestamp
/// - `author_id`: integer (or integer string)
///
/// Whether `isbn` is unique and `author_id` names a live author is decided
/// by the storage rules.
pub fn book_rules(mode: RuleMode, fields: &Fields) -> Checked<BookInput> {
    let mut errors = ValidationErrors::new();
    let mut input = BookInput::default();

    if let Some(title) = string_field(mode, fields, "title", "Please enter Title.", &mut errors) {
        if title.chars().count() > MAX_TITLE_LEN {
            errors.add(
                "title",
                FieldErrorKind::FormatInvalid,
                too_long("title", MAX_TITLE_LEN),
            );
        } else {
            input.title = Some(title);
        }
    }

    if let Some(isbn) = string_field(mode, fields, "isbn", "Please enter ISBN.", &mut errors) {
        if isbn.chars().count() > MAX_ISBN_LEN {
            errors.add(
                "isbn",
                FieldErrorKind::FormatInvalid,
                too_long("isbn", MAX_ISBN_LEN),
            );
        } else {
            input.isbn = Some(isbn);
        }
    }

    match presence(mode, fields, "published_date") {
        Presence::Skip => {}
        Presence::Missing => errors.add(
            "published_date",
            FieldErrorKind::RequiredMissing,
            "Please enter published date.",
        ),
        Presence::Value(value) => match value.as_str().and_then(parse_date) {
            Some(date) => input.published_date = Some(date),
            None => errors.add(
                "published_date",
                FieldErrorKind::FormatInvalid,
                "The published date field must be a valid date.",
            ),
        },
    }

    match presence(mode, fields, "author_id") {
        Presence::Skip => {}
        Presence::Missing => errors.add(
            "author_id",
            FieldErrorKind::RequiredMissing,
            "Please enter author ID.",
        ),
        Presence::Value(value) => match parse_id(value) {
            Some(id) => input.author_id = Some(id),
            // Cannot reference any row, so it fails the same way as an unknown id.
            None => errors.add(
                "author_id",
                FieldErrorKind::NotFoundReference,
                messages::AUTHOR_MISSING,
            ),
        },
    }

    Checked { input, errors }
}

// =============================================================================
// Field Helpers
// =============================================================================

enum Presence<'a> {
    /// Absent under update rules: nothing to check.
    Skip,
    /// Absent under create rules, or present but null/blank.
    Missing,
    Value(&'a Value),
}

fn presence<'a>(mode: RuleMode, fields: &'a Fields, field: &str) -> Presence<'a> {
    match fields.get(field) {
        None if mode.is_create() => Presence::Missing,
        None => Presence::Skip,
        Some(value) if is_blank(value) => Presence::Missing,
        Some(value) => Presence::Value(value),
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Presence + string type check. Returns the trimmed string on success.
fn string_field(
    mode: RuleMode,
    fields: &Fields,
    field: &str,
    required_msg: &str,
    errors: &mut ValidationErrors,
) -> Option<String> {
    match presence(mode, fields, field) {
        Presence::Skip => None,
        Presence::Missing => {
            errors.add(field, FieldErrorKind::RequiredMissing, required_msg);
            None
        }
        Presence::Value(Value::String(s)) => Some(s.trim().to_string()),
        Presence::Value(_) => {
            errors.add(
                field,
                FieldErrorKind::FormatInvalid,
                format!("The {} field must be a string.", field),
            );
            None
        }
    }
}

fn default_required(field: &str) -> String {
    format!("The {} field is required.", field)
}

fn too_long(field: &str, max: usize) -> String {
    format!(
        "The {} field must not be greater than {} characters.",
        field, max
    )
}

/// Dot-atom local part, then dot-separated domain labels. Labels may be
/// non-ASCII and must not start or end with `-`; a TLD is not required.
const EMAIL_PATTERN: &str = concat!(
    r#"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+"#,
    r"@[\p{L}\p{N}](?:[\p{L}\p{N}-]*[\p{L}\p{N}])?",
    r"(?:\.[\p{L}\p{N}](?:[\p{L}\p{N}-]*[\p{L}\p{N}])?)*$",
);

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is a valid regex"))
}

/// Checks email syntax (`local@domain`). Quoted local parts and IP-literal
/// domains are not accepted.
pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

/// Parses `YYYY-MM-DD`, or takes the date part of an RFC 3339 timestamp.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
}

/// Parses a record id from a JSON integer or an integer string.
pub fn parse_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_author_create_valid() {
        let checked = author_rules(
            RuleMode::Create,
            &fields(json!({ "name": "  Ahmed Elragal ", "email": "ahmed@gmail.com" })),
        );

        assert!(checked.errors.is_empty());
        let new = checked.input.into_new().unwrap();
        assert_eq!(new.name, "Ahmed Elragal");
        assert_eq!(new.email, "ahmed@gmail.com");
    }

    #[test]
    fn test_author_create_missing_fields() {
        let checked = author_rules(RuleMode::Create, &fields(json!({ "name": "   " })));

        let name = checked.errors.get("name").unwrap();
        assert_eq!(name.kind, FieldErrorKind::RequiredMissing);
        assert_eq!(name.message, "Please enter name.");

        let email = checked.errors.get("email").unwrap();
        assert_eq!(email.kind, FieldErrorKind::RequiredMissing);
        assert_eq!(email.message, "Please enter email.");
    }

    #[test]
    fn test_author_email_format() {
        let create = author_rules(
            RuleMode::Create,
            &fields(json!({ "name": "Omar", "email": "omar-at-gmail" })),
        );
        let err = create.errors.get("email").unwrap();
        assert_eq!(err.kind, FieldErrorKind::FormatInvalid);
        assert_eq!(err.message, "Please enter valid email");
        assert!(create.input.email.is_none());

        let update = author_rules(
            RuleMode::Update { id: 1 },
            &fields(json!({ "email": "x@" })),
        );
        assert_eq!(
            update.errors.get("email").unwrap().message,
            "Please enter a valid email."
        );
    }

    #[test]
    fn test_email_syntax() {
        for ok in [
            "ahmed@gmail.com",
            "omar.a+books@mail.example.co",
            "user@localhost",
            "ahmed@exämple.com",
            "o'brien@example.org",
        ] {
            assert!(is_valid_email(ok), "{ok} should be accepted");
        }

        for bad in [
            "omar-at-gmail",
            "x@",
            "@gmail.com",
            "a b@c.com",
            "a@-b.com",
            "a@b-.com",
            "a@b..com",
            "a@b.com.",
            "a@b@c.com",
        ] {
            assert!(!is_valid_email(bad), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_author_name_must_be_string() {
        let checked = author_rules(
            RuleMode::Create,
            &fields(json!({ "name": 42, "email": "a@b.co" })),
        );
        let err = checked.errors.get("name").unwrap();
        assert_eq!(err.kind, FieldErrorKind::FormatInvalid);
        assert_eq!(err.message, "The name field must be a string.");
    }

    #[test]
    fn test_author_update_all_optional() {
        let checked = author_rules(RuleMode::Update { id: 3 }, &Fields::new());
        assert!(checked.errors.is_empty());
        assert!(checked.input.into_changes().is_empty());
    }

    #[test]
    fn test_author_update_present_but_blank() {
        let checked = author_rules(RuleMode::Update { id: 3 }, &fields(json!({ "name": null })));
        let err = checked.errors.get("name").unwrap();
        assert_eq!(err.kind, FieldErrorKind::RequiredMissing);
        assert_eq!(err.message, "The name field is required.");
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let checked = author_rules(
            RuleMode::Update { id: 3 },
            &fields(json!({ "id": 99, "deleted_at": "2020-01-01" })),
        );
        assert!(checked.errors.is_empty());
        assert!(checked.input.into_changes().is_empty());
    }

    #[test]
    fn test_book_create_valid() {
        let checked = book_rules(
            RuleMode::Create,
            &fields(json!({
                "title": "Book 1",
                "isbn": "332",
                "published_date": "2022-02-28",
                "author_id": "1"
            })),
        );

        assert!(checked.errors.is_empty());
        let new = checked.input.into_new().unwrap();
        assert_eq!(new.author_id, 1);
        assert_eq!(
            new.published_date,
            NaiveDate::from_ymd_opt(2022, 2, 28).unwrap()
        );
    }

    #[test]
    fn test_book_create_requires_everything() {
        let checked = book_rules(RuleMode::Create, &Fields::new());

        assert_eq!(checked.errors.len(), 4);
        assert_eq!(
            checked.errors.get("title").unwrap().message,
            "Please enter Title."
        );
        assert_eq!(
            checked.errors.get("isbn").unwrap().message,
            "Please enter ISBN."
        );
        assert_eq!(
            checked.errors.get("published_date").unwrap().message,
            "Please enter published date."
        );
        assert_eq!(
            checked.errors.get("author_id").unwrap().message,
            "Please enter author ID."
        );
        assert!(checked.errors.iter().all(|e| e.kind == FieldErrorKind::RequiredMissing));
    }

    #[test]
    fn test_book_lengths() {
        let checked = book_rules(
            RuleMode::Update { id: 1 },
            &fields(json!({ "title": "T".repeat(256), "isbn": "97800000000001" })),
        );

        assert_eq!(
            checked.errors.get("title").unwrap().kind,
            FieldErrorKind::FormatInvalid
        );
        assert_eq!(
            checked.errors.get("isbn").unwrap().message,
            "The isbn field must not be greater than 13 characters."
        );

        let ok = book_rules(
            RuleMode::Update { id: 1 },
            &fields(json!({ "title": "T".repeat(255), "isbn": "9780000000000" })),
        );
        assert!(ok.errors.is_empty());
    }

    #[test]
    fn test_book_dates() {
        assert_eq!(
            parse_date("2002-08-26"),
            NaiveDate::from_ymd_opt(2002, 8, 26)
        );
        assert_eq!(
            parse_date("2002-08-26T10:00:00Z"),
            NaiveDate::from_ymd_opt(2002, 8, 26)
        );
        assert!(parse_date("2023-02-30").is_none());
        assert!(parse_date("yesterday").is_none());

        let checked = book_rules(
            RuleMode::Update { id: 1 },
            &fields(json!({ "published_date": 20220228 })),
        );
        assert_eq!(
            checked.errors.get("published_date").unwrap().kind,
            FieldErrorKind::FormatInvalid
        );
    }

    #[test]
    fn test_book_author_id_not_an_id() {
        let checked = book_rules(
            RuleMode::Update { id: 1 },
            &fields(json!({ "author_id": "abc" })),
        );
        let err = checked.errors.get("author_id").unwrap();
        assert_eq!(err.kind, FieldErrorKind::NotFoundReference);
        assert_eq!(err.message, messages::AUTHOR_MISSING);
    }

    #[test]
    fn test_ignore_id() {
        assert_eq!(RuleMode::Create.ignore_id(), None);
        assert_eq!(RuleMode::Update { id: 7 }.ignore_id(), Some(7));
    }
}
