//! # Seed Data
//!
//! Populates the database with the sample authors and books.
//!
//! ## Usage
//! ```bash
//! # Seed ./library.db (created if missing)
//! cargo run -p library-db --bin seed
//!
//! # Specify database path
//! cargo run -p library-db --bin seed -- --db ./data/library.db
//! ```
//!
//! Rows go through the services, so every record passes the same rules as
//! an API request. Running it twice is harmless: authors whose email is
//! already taken and books whose ISBN is already taken are skipped.

use std::collections::HashMap;
use std::env;

use anyhow::{bail, Context};
use library_core::validation::Fields;
use library_core::{CoreError, FieldErrorKind};
use library_db::{Database, DbConfig, ServiceError};
use serde_json::json;

/// (name, email)
const AUTHORS: &[(&str, &str)] = &[
    ("Ahmed Elragal", "ahmed@gmail.com"),
    ("Omar Ahmed", "omar@gmail.com"),
    ("Mohamed Hassan", "mohamed@yahoo.com"),
];

/// (title, isbn, published_date, author email)
const BOOKS: &[(&str, &str, &str, &str)] = &[
    ("Book 1", "332", "2022-02-28", "ahmed@gmail.com"),
    ("Book 2", "268", "2002-08-26", "ahmed@gmail.com"),
    ("Book 3", "538", "2002-08-26", "omar@gmail.com"),
    ("Book 4", "324", "2002-08-26", "omar@gmail.com"),
    ("Book 5", "978", "2002-08-26", "mohamed@yahoo.com"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./library.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                let Some(path) = args.get(i + 1) else {
                    bail!("--db needs a path");
                };
                db_path = path.clone();
                i += 1;
            }
            "--help" | "-h" => {
                println!("Library Seed Data");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./library.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => bail!("unknown argument: {}", other),
        }
        i += 1;
    }

    println!("Library Seed Data");
    println!("=================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path))
        .await
        .with_context(|| format!("opening {}", db_path))?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");
    println!();

    let authors = db.author_service();
    for (name, email) in AUTHORS {
        let body = fields(json!({ "name": name, "email": email }));
        match authors.create(&body).await {
            Ok(author) => println!("  + author {} (id {})", author.name, author.id),
            Err(err) if is_taken(&err, "email") => println!("  = author {} already present", email),
            Err(err) => return Err(err).with_context(|| format!("seeding author {}", email)),
        }
    }

    let author_ids: HashMap<String, i64> = authors
        .list()
        .await?
        .into_iter()
        .map(|a| (a.email, a.id))
        .collect();

    let books = db.book_service();
    for (title, isbn, published_date, author_email) in BOOKS {
        let Some(author_id) = author_ids.get(*author_email) else {
            println!(
                "  ! book {} skipped: author {} is deleted",
                title, author_email
            );
            continue;
        };

        let body = fields(json!({
            "title": title,
            "isbn": isbn,
            "published_date": published_date,
            "author_id": author_id,
        }));
        match books.create(&body).await {
            Ok(book) => println!("  + book {} (id {})", book.title, book.id),
            Err(err) if is_taken(&err, "isbn") => println!("  = book {} already present", isbn),
            Err(err) => return Err(err).with_context(|| format!("seeding book {}", isbn)),
        }
    }

    println!();
    println!(
        "✓ Seed complete: {} authors, {} books",
        db.authors().count().await?,
        db.books().count().await?
    );

    db.close().await;
    Ok(())
}

fn fields(value: serde_json::Value) -> Fields {
    match value {
        serde_json::Value::Object(map) => map,
        _ => Fields::new(),
    }
}

fn is_taken(err: &ServiceError, field: &str) -> bool {
    match err.as_domain() {
        Some(CoreError::Validation(errors)) => errors
            .get(field)
            .is_some_and(|e| e.kind == FieldErrorKind::NotUnique),
        _ => false,
    }
}
