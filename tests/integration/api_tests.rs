//! API integration tests

use std::fs;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use folio_server::{
    api::{self, books::BookIndexPage},
    config::{BookSource, LibraryConfig},
    models::PathKey,
    services::books::BookService,
    AppConfig, AppState,
};

/// Helper to build a router over one book stored in a temporary directory
async fn test_app(dir: &tempfile::TempDir) -> (Router, AppState) {
    let content = dir.path().join("content");
    fs::create_dir_all(content.join("guide")).unwrap();
    fs::write(content.join("index.md"), "# Welcome").unwrap();
    fs::write(content.join("guide/setup.md"), "# Setup").unwrap();
    fs::write(content.join("release notes.md"), "# Changes").unwrap();

    let properties = dir.path().join("book.json");
    fs::write(
        &properties,
        r#"{
            "title": "User Guide",
            "copyright.rightsHolder": "Folio",
            "copyright.dateCopyrighted": "2026",
            "author.1.name": "Ada",
            "author.2.page": "/guide/setup.md",
            "param.theme": "dark",
            "canonicalBase": "https://docs.example/",
            "content.root": "/index.md"
        }"#,
    )
    .unwrap();

    let library = LibraryConfig {
        books: vec![BookSource {
            name: "/docs".to_string(),
            work_directory: content.display().to_string(),
            allow_robots: true,
            properties,
            parents: Vec::new(),
        }],
    };

    let books = BookService::load(&library).await.expect("Failed to load books");
    let state = AppState::new(AppConfig::default(), books);
    state.services.pages.routes().register(
        PathKey::root(),
        Arc::new(BookIndexPage::new(state.services.books.clone())),
    );

    (api::router(state.clone()), state)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .expect("Failed to send request");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    (status, body.to_vec())
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let (status, body) = get(app, uri).await;
    let body: Value = serde_json::from_slice(&body).expect("Failed to parse response");
    (status, body)
}

#[tokio::test]
async fn test_health_check() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = test_app(&dir).await;

    let (status, body) = get_json(&app, "/api/v1/health").await;
    assert!(status.is_success());
    assert_eq!(body["status"], "healthy");

    let (status, body) = get_json(&app, "/api/v1/ready").await;
    assert!(status.is_success());
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_list_books() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = test_app(&dir).await;

    let (status, body) = get_json(&app, "/api/v1/books").await;
    assert_eq!(status, StatusCode::OK);

    let book = &body[0];
    assert_eq!(book["name"], "/docs");
    assert_eq!(book["title"], "User Guide");
    assert_eq!(book["allow_robots"], true);
    assert_eq!(book["canonical_base"], "https://docs.example");
    assert_eq!(book["content_root"], "/docs/index.md");
    assert_eq!(book["copyright"]["rights_holder"], "Folio");
    assert_eq!(book["copyright"]["rights"], "");
    assert_eq!(book["authors"][0]["name"], "Ada");
    assert_eq!(book["authors"][1]["book"], "/docs");
    assert_eq!(book["param"]["theme"], "dark");
}

#[tokio::test]
async fn test_book_index_page() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = test_app(&dir).await;

    let (status, body) = get_json(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["id"], "/docs");
}

#[tokio::test]
async fn test_serve_source_files() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = test_app(&dir).await;

    let (status, body) = get(&app, "/docs/index.md").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"# Welcome");

    let (status, body) = get(&app, "/docs/guide/setup.md").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"# Setup");

    let (status, body) = get_json(&app, "/docs/missing.md").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NoSuchPage");
}

#[tokio::test]
async fn test_serve_percent_encoded_paths() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = test_app(&dir).await;

    let (status, body) = get(&app, "/docs/release%20notes.md").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"# Changes");

    // Decoded dot segments are still rejected
    let (status, _) = get_json(&app, "/docs/%2e%2e/book.json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get_json(&app, "/docs/%FF.md").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");
}

#[tokio::test]
async fn test_page_exists() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = test_app(&dir).await;

    let (status, body) = get_json(&app, "/api/v1/pages/exists?path=/docs/index.md").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["exists"], true);

    let (_, body) = get_json(&app, "/api/v1/pages/exists?path=/docs/nope.md").await;
    assert_eq!(body["exists"], false);

    let (status, _) = get_json(&app, "/api/v1/pages/exists?path=docs").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_requests_fail_after_shutdown() {
    let dir = tempfile::tempdir().unwrap();
    let (app, state) = test_app(&dir).await;
    state.services.pages.routes().shutdown();

    let (status, body) = get_json(&app, "/docs/index.md").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "DispatchFailure");

    let (status, _) = get_json(&app, "/api/v1/ready").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
