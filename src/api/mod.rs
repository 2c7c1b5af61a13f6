//! API handlers for Folio HTTP endpoints

pub mod books;
pub mod health;
pub mod pages;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Books
        .route("/books", get(books::list_books))
        // Pages
        .route("/pages/exists", get(pages::page_exists));

    Router::new()
        .nest("/api/v1", api_v1)
        .fallback(get(pages::serve_page))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
