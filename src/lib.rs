//! Folio page server
//!
//! Serves the pages of a library of books. A page is either produced by a
//! handler registered in the route table or read from the working copy of
//! the book it belongs to. Each book is configured by a closed set of
//! properties describing its authors, copyright and content root.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

use repository::{ApplicationScope, RouteTable};
use services::{books::BookService, Services};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub scope: Arc<ApplicationScope>,
    pub services: Arc<Services>,
}

impl AppState {
    /// Create the application scope and the services living in it
    pub fn new(config: AppConfig, books: BookService) -> Self {
        let scope = Arc::new(ApplicationScope::new());
        repository::initialize(&scope);

        let routes = Arc::new(RouteTable::new());
        let services = Services::new(scope.clone(), routes, books);

        Self {
            config: Arc::new(config),
            scope,
            services: Arc::new(services),
        }
    }
}
