//! Business logic services

pub mod book_config;
pub mod books;
pub mod pages;

use std::sync::Arc;

use crate::repository::{ApplicationScope, RouteTable};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub books: books::BookService,
    pub pages: pages::PageService,
}

impl Services {
    /// Create all services over the given scope and route table
    pub fn new(scope: Arc<ApplicationScope>, routes: Arc<RouteTable>, books: books::BookService) -> Self {
        Self {
            pages: pages::PageService::new(scope, routes, books.clone()),
            books,
        }
    }
}
