//! Page dispatch service
//!
//! A request path is first offered to the route table, mounted at `/`. When no
//! handler claims it, the book whose name is the longest prefix of the path
//! serves it from its working copy.

use std::sync::Arc;

use axum::response::Response;

use super::books::{BookEntry, BookService};
use crate::{
    error::{AppError, AppResult},
    models::PathKey,
    repository::{ApplicationScope, DispatchTarget, PathRepository, RouteTable, WorkDirectory},
};

#[derive(Clone)]
pub struct PageService {
    scope: Arc<ApplicationScope>,
    routes: Arc<RouteTable>,
    books: BookService,
}

impl PageService {
    pub fn new(scope: Arc<ApplicationScope>, routes: Arc<RouteTable>, books: BookService) -> Self {
        Self {
            scope,
            routes,
            books,
        }
    }

    pub fn routes(&self) -> &Arc<RouteTable> {
        &self.routes
    }

    /// Repository over the route table
    pub fn route_repository(&self) -> Arc<PathRepository<RouteTable>> {
        PathRepository::get_instance(&self.scope, PathKey::root(), &self.routes)
    }

    /// Repository over a book's working copy, keyed by the book name
    pub fn book_repository(&self, entry: &BookEntry) -> Arc<PathRepository<WorkDirectory>> {
        PathRepository::get_instance(&self.scope, entry.book.name().clone(), &entry.pages)
    }

    /// The book repository for `path` and the sub-path below its prefix
    fn book_target<'a>(&self, path: &'a PathKey) -> Option<(Arc<PathRepository<WorkDirectory>>, &'a str)> {
        let entry = self.books.find_for_path(path.as_str())?;
        let repository = self.book_repository(entry);
        let sub_path = path
            .as_str()
            .strip_prefix(repository.prefix())
            .filter(|sub_path| !sub_path.is_empty())
            .unwrap_or("/");
        Some((repository, sub_path))
    }

    /// Whether any handler or source file serves `path`
    pub async fn exists(&self, path: &PathKey) -> AppResult<bool> {
        if self.route_repository().exists(path.as_str()).await? {
            return Ok(true);
        }
        match self.book_target(path) {
            Some((repository, sub_path)) => repository.exists(sub_path).await,
            None => Ok(false),
        }
    }

    /// Find what serves `path`, if anything
    pub async fn resolve(&self, path: &PathKey) -> AppResult<Option<DispatchTarget>> {
        if let Some(target) = self.route_repository().resolve_dispatch_target(path.as_str()).await? {
            return Ok(Some(target));
        }
        match self.book_target(path) {
            Some((repository, sub_path)) => repository.resolve_dispatch_target(sub_path).await,
            None => Ok(None),
        }
    }

    /// Resolve `path` and invoke its handler
    pub async fn dispatch(&self, path: &PathKey) -> AppResult<Response> {
        match self.resolve(path).await? {
            Some(target) => {
                tracing::debug!("Dispatching {} to {}", path, target.path);
                target.invoke().await
            }
            None => Err(AppError::NotFound(format!("Page {} not found", path))),
        }
    }
}
