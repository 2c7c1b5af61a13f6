//! Books API endpoints

use async_trait::async_trait;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    error::AppResult,
    models::BookSummary,
    repository::PageHandler,
    services::books::BookService,
    AppState,
};

/// List all books
pub async fn list_books(State(state): State<AppState>) -> Json<Vec<BookSummary>> {
    Json(state.services.books.list().map(|book| book.summary()).collect())
}

/// Page listing every book, registered in the route table at `/`
pub struct BookIndexPage {
    books: BookService,
}

impl BookIndexPage {
    pub fn new(books: BookService) -> Self {
        Self { books }
    }
}

#[async_trait]
impl PageHandler for BookIndexPage {
    async fn handle(&self, _path: &str) -> AppResult<Response> {
        let summaries: Vec<BookSummary> = self.books.list().map(|book| book.summary()).collect();
        Ok(Json(summaries).into_response())
    }
}
