//! End-to-end tests of the HTTP surface against an in-memory database.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use library_api::build_router;
use library_db::{Database, DbConfig};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn app() -> Router {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    build_router(db)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let body = match body {
        Some(value) => Body::from(value.to_string()),
        None => Body::empty(),
    };
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body)
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| json!(String::from_utf8_lossy(&bytes)))
    };
    (status, value)
}

async fn seed(app: &Router) {
    for (name, email) in [
        ("Ahmed Elragal", "ahmed@gmail.com"),
        ("Omar Ahmed", "omar@gmail.com"),
        ("Mohamed Hassan", "mohamed@yahoo.com"),
    ] {
        let body = json!({ "name": name, "email": email });
        let (status, _) = send(app, "POST", "/authors", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    for (i, (isbn, author_id)) in [("332", 1), ("268", 1), ("538", 2), ("324", 2), ("978", 3)]
        .into_iter()
        .enumerate()
    {
        let body = json!({
            "title": format!("Book {}", i + 1),
            "isbn": isbn,
            "published_date": "2002-08-26",
            "author_id": author_id
        });
        let (status, _) = send(app, "POST", "/books", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
    }
}

#[tokio::test]
async fn author_lifecycle() {
    let app = app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/authors",
        Some(json!({ "name": "Omar Ahmed", "email": "omar@gmail.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        body,
        json!({ "status": 201, "data": { "message": "Author created successfully" } })
    );

    let (status, body) = send(&app, "GET", "/authors", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], 200);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    let id = body["data"][0]["id"].as_i64().unwrap();

    let (status, body) = send(&app, "GET", &format!("/authors/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "omar@gmail.com");
    assert!(body["data"]["deleted_at"].is_null());

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/authors/{}", id),
        Some(json!({ "name": "Omar A." })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["message"], "Author updated successfully");

    let (_, body) = send(&app, "GET", &format!("/authors/{}", id), None).await;
    assert_eq!(body["data"]["name"], "Omar A.");
    assert_eq!(body["data"]["email"], "omar@gmail.com");

    let (status, body) = send(&app, "DELETE", &format!("/authors/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["message"], "Author deleted successfully");

    let (status, body) = send(&app, "GET", &format!("/authors/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({ "status": 404, "message": "Author not found" })
    );

    let (status, _) = send(&app, "DELETE", &format!("/authors/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn validation_errors_are_422_with_fields() {
    let app = app().await;

    let (status, body) = send(&app, "POST", "/authors", Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["status"], 422);
    assert_eq!(body["message"], "Please enter name. (and 1 more error)");
    assert_eq!(body["errors"]["name"], json!(["Please enter name."]));
    assert_eq!(body["errors"]["email"], json!(["Please enter email."]));

    let first = json!({ "name": "Omar", "email": "omar@gmail.com" });
    send(&app, "POST", "/authors", Some(first)).await;
    let (status, body) = send(
        &app,
        "POST",
        "/authors",
        Some(json!({ "name": "Other Omar", "email": "omar@gmail.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["errors"]["email"],
        json!(["This email has already been used."])
    );
}

#[tokio::test]
async fn bad_ids_and_bodies() {
    let app = app().await;

    let (status, body) = send(&app, "GET", "/books/abc", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Book not found");

    let request = Request::builder()
        .method("POST")
        .uri("/authors")
        .header("content-type", "application/json")
        .body(Body::from("{\"name\":"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // No body at all is an empty mapping, so the create rules report both fields.
    let (status, body) = send(&app, "POST", "/authors", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["name"].is_array());
}

#[tokio::test]
async fn empty_update_succeeds_without_changes() {
    let app = app().await;
    seed(&app).await;

    let (_, before) = send(&app, "GET", "/books/1", None).await;
    let (status, body) = send(&app, "PUT", "/books/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["message"], "Book updated successfully");

    let (_, after) = send(&app, "GET", "/books/1", None).await;
    assert_eq!(before, after);
}

#[tokio::test]
async fn search_books() {
    let app = app().await;
    seed(&app).await;

    let (status, body) = send(&app, "GET", "/books/search?title=Book", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 5);

    let (status, body) = send(&app, "GET", "/books/search?title=zzz", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "status": 404, "message": "Book not found" }));

    for uri in ["/books/search", "/books/search?title="] {
        let (status, body) = send(&app, "GET", uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({ "status": 400, "message": "Title parameter is required" })
        );
    }
}

#[tokio::test]
async fn book_author_reference_rules() {
    let app = app().await;
    seed(&app).await;

    let (status, _) = send(&app, "DELETE", "/authors/3", None).await;
    assert_eq!(status, StatusCode::OK);

    // Book 5 belongs to the deleted author and is still served.
    let (status, body) = send(&app, "GET", "/books/5", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["author_id"], 3);

    let (status, body) = send(
        &app,
        "POST",
        "/books",
        Some(json!({
            "title": "Book 6",
            "isbn": "111",
            "published_date": "2024-01-01",
            "author_id": 3
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["errors"]["author_id"],
        json!(["The selected author does not exist or has been deleted."])
    );

    let (status, body) = send(&app, "PUT", "/books/1", Some(json!({ "isbn": "268" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["errors"]["isbn"],
        json!(["This ISBN has already been used."])
    );
}

#[tokio::test]
async fn health_check() {
    let app = app().await;

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn extractor_failures_keep_the_envelope() {
    let app = app().await;
    seed(&app).await;

    for (method, uri, entity) in [
        ("GET", "/books/%FF", "Book"),
        ("PUT", "/books/%FF", "Book"),
        ("DELETE", "/authors/%FF", "Author"),
    ] {
        let (status, body) = send(&app, method, uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            json!({ "status": 404, "message": format!("{} not found", entity) })
        );
    }

    let (status, body) = send(&app, "GET", "/books/search?title=a&title=b", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
    assert!(body["message"].as_str().unwrap().contains("title"));
}
