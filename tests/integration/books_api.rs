//! HTTP-level behaviour of the /books resource

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::common::{
    envelope_json, power_up, router_with, seeded_router, send, BrokenBookStore, MemoryBookStore,
};

#[tokio::test]
async fn lists_all_books() {
    let app = seeded_router().await;

    let (status, body) = send(&app, Method::GET, "/books", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "books": [power_up()] }));
}

#[tokio::test]
async fn empty_catalog_lists_nothing() {
    let app = router_with(Arc::new(MemoryBookStore::default()));

    let (status, body) = send(&app, Method::GET, "/books", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "books": [] }));
}

#[tokio::test]
async fn gets_a_single_book() {
    let app = seeded_router().await;

    let (status, body) = send(&app, Method::GET, "/books/0691161518", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "book": power_up() }));
}

#[tokio::test]
async fn unknown_isbn_is_404() {
    let app = seeded_router().await;

    let (status, body) = send(&app, Method::GET, "/books/badISBN", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["status"], 404);
    assert!(body["error"]["message"].is_string());
}

#[tokio::test]
async fn creates_a_book_and_echoes_it() {
    let app = seeded_router().await;

    let (status, body) = send(&app, Method::POST, "/books", Some(envelope_json())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({ "book": envelope_json() }));

    let (status, body) = send(&app, Method::GET, "/books/0008324581", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "book": envelope_json() }));
}

#[tokio::test]
async fn duplicate_isbn_is_409() {
    let app = seeded_router().await;

    let (status, _) = send(&app, Method::POST, "/books", Some(envelope_json())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, Method::POST, "/books", Some(envelope_json())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["status"], 409);

    let (_, body) = send(&app, Method::GET, "/books", None).await;
    assert_eq!(body["books"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn create_requires_every_field() {
    let app = seeded_router().await;

    let (status, body) =
        send(&app, Method::POST, "/books", Some(json!({ "isbn": "0008324581" }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["status"], 400);
    let message = body["error"]["message"].as_str().unwrap();
    assert!(message.contains("author is required"));
    assert!(message.contains("year is required"));
}

#[tokio::test]
async fn create_rejects_negative_pages() {
    let app = seeded_router().await;
    let mut data = envelope_json();
    data["pages"] = json!(-1);
    data["year"] = json!(2080);

    let (status, body) = send(&app, Method::POST, "/books", Some(data)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"]["message"],
        "pages must be greater than or equal to 0"
    );

    let (status, _) = send(&app, Method::GET, "/books/0008324581", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_json_is_400() {
    let app = seeded_router().await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/books")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{\"isbn\": "))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn updates_a_book() {
    let app = seeded_router().await;
    let mut data = envelope_json();
    data["isbn"] = json!("0691161518");

    let (status, body) = send(&app, Method::PUT, "/books/0691161518", Some(data.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "book": data }));

    let (_, body) = send(&app, Method::GET, "/books/0691161518", None).await;
    assert_eq!(body, json!({ "book": data }));
}

#[tokio::test]
async fn patch_is_a_full_replacement() {
    let app = seeded_router().await;
    let mut data = envelope_json();
    data["isbn"] = json!("0691161518");

    let (status, _) = send(&app, Method::PATCH, "/books/0691161518", Some(data)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        Method::PATCH,
        "/books/0691161518",
        Some(json!({ "title": "Only a title" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn path_isbn_wins_over_body_isbn() {
    let app = seeded_router().await;

    let (status, body) =
        send(&app, Method::PUT, "/books/0691161518", Some(envelope_json())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["book"]["isbn"], "0691161518");
    assert_eq!(body["book"]["author"], "Rob Eastway");

    let (status, _) = send(&app, Method::GET, "/books/0008324581", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_requires_every_field() {
    let app = seeded_router().await;

    let (status, _) = send(
        &app,
        Method::PUT,
        "/books/0691161518",
        Some(json!({ "isbn": "0008324581" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invalid_update_leaves_book_unchanged() {
    let app = seeded_router().await;
    let mut data = envelope_json();
    data["pages"] = json!(-1);
    data["year"] = json!(2080);

    let (status, _) = send(&app, Method::PUT, "/books/0691161518", Some(data)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, Method::GET, "/books/0691161518", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["book"]["pages"], 264);
}

#[tokio::test]
async fn updating_unknown_book_is_404() {
    let app = seeded_router().await;

    let (status, _) = send(&app, Method::PUT, "/books/badISBN", Some(envelope_json())).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deletes_a_book() {
    let app = seeded_router().await;

    let (status, body) = send(&app, Method::DELETE, "/books/0691161518", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Book deleted" }));

    let (status, _) = send(&app, Method::DELETE, "/books/0691161518", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_route_uses_error_body() {
    let app = seeded_router().await;

    let (status, body) = send(&app, Method::GET, "/authors", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": { "message": "Not Found", "status": 404 } }));
}

#[tokio::test]
async fn store_failure_is_generic_500() {
    let app = router_with(Arc::new(BrokenBookStore));

    let (status, body) = send(&app, Method::GET, "/books/0691161518", None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({ "error": { "message": "Internal Server Error", "status": 500 } })
    );
}

#[tokio::test]
async fn readiness_follows_the_store() {
    let (status, body) = send(&seeded_router().await, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");

    let broken = router_with(Arc::new(BrokenBookStore));
    let (status, _) = send(&broken, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, body): (StatusCode, Value) = send(&broken, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}
