//! Path-prefix page repositories
//!
//! A [`PathRepository`] answers existence and dispatch queries for sub-paths
//! under a fixed prefix. It does not know how pages are produced: each query is
//! forwarded to its [`DispatchProvider`] with the prefix prepended.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use axum::response::Response;

use super::registry::InstanceRegistry;
use super::scope::ApplicationScope;
use crate::{error::AppResult, models::PathKey};

/// Produces the response for a dispatched page
#[async_trait]
pub trait PageHandler: Send + Sync {
    /// Handle a request for `path`, the fully resolved path the handler was
    /// found at.
    async fn handle(&self, path: &str) -> AppResult<Response>;
}

/// Opaque handle to the handler registered at a resolved path
#[derive(Clone)]
pub struct DispatchHandle(Arc<dyn PageHandler>);

impl DispatchHandle {
    pub fn new(handler: Arc<dyn PageHandler>) -> Self {
        Self(handler)
    }

    pub async fn invoke(&self, path: &str) -> AppResult<Response> {
        self.0.handle(path).await
    }
}

impl fmt::Debug for DispatchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DispatchHandle(..)")
    }
}

/// Maps a resolved path to the handler registered there
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DispatchProvider: Send + Sync + 'static {
    /// Short label used in diagnostics, such as `servlet`
    fn scheme(&self) -> &'static str;

    /// Find the handler for `path`.
    ///
    /// Returns `Ok(None)` when nothing is registered there, and an I/O error
    /// when the provider itself cannot be queried.
    async fn lookup(&self, path: &str) -> AppResult<Option<DispatchHandle>>;
}

/// A resolved path paired with the handle serving it
#[derive(Debug, Clone)]
pub struct DispatchTarget {
    pub path: String,
    pub handle: DispatchHandle,
}

impl DispatchTarget {
    pub async fn invoke(&self) -> AppResult<Response> {
        self.handle.invoke(&self.path).await
    }
}

/// Pages found by prefixing sub-paths with a fixed path.
///
/// Instances are shared: there is at most one per provider type, scope and
/// normalized path, obtained through [`PathRepository::get_instance`].
pub struct PathRepository<P> {
    provider: Arc<P>,
    path: PathKey,
    prefix: String,
}

impl<P: DispatchProvider> PathRepository<P> {
    /// Get the repository for `path` in `scope`.
    ///
    /// Trailing slashes on `path` are stripped. `provider` is only used when
    /// the repository does not exist yet.
    pub fn get_instance(scope: &ApplicationScope, path: PathKey, provider: &Arc<P>) -> Arc<Self> {
        InstanceRegistry::<Self>::for_scope(scope)
            .get_or_create(path, |path| Self::new(provider.clone(), path.clone()))
    }

    /// Create the registry for this repository type ahead of the first lookup
    pub fn initialize(scope: &ApplicationScope) {
        let registry = InstanceRegistry::<Self>::for_scope(scope);
        tracing::debug!("Initialized {:?} for {}", registry, std::any::type_name::<P>());
    }

    fn new(provider: Arc<P>, path: PathKey) -> Self {
        let prefix = path.prefix().to_string();
        Self {
            provider,
            path,
            prefix,
        }
    }

    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    /// The path, without any trailing slash except for `/`
    pub fn path(&self) -> &PathKey {
        &self.path
    }

    /// The path for direct concatenation: empty for `/`
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Join the prefix and `sub_path` without inserting a separator.
    ///
    /// `sub_path` must begin with `/`; otherwise the joined path is malformed
    /// (`/docs` + `intro` gives `/docsintro`).
    pub fn resolve_path(&self, sub_path: &str) -> String {
        if self.prefix.is_empty() {
            sub_path.to_string()
        } else {
            let mut resolved = String::with_capacity(self.prefix.len() + sub_path.len());
            resolved.push_str(&self.prefix);
            resolved.push_str(sub_path);
            resolved
        }
    }

    /// Whether a handler is registered for `sub_path`.
    ///
    /// True exactly when [`resolve_dispatch_target`](Self::resolve_dispatch_target)
    /// would return a target.
    pub async fn exists(&self, sub_path: &str) -> AppResult<bool> {
        Ok(self.resolve_dispatch_target(sub_path).await?.is_some())
    }

    /// Find the handler for `sub_path`, or `None` if nothing is registered.
    ///
    /// Every call queries the provider again.
    pub async fn resolve_dispatch_target(&self, sub_path: &str) -> AppResult<Option<DispatchTarget>> {
        let path = self.resolve_path(sub_path);
        let handle = self.provider.lookup(&path).await?;
        Ok(handle.map(|handle| DispatchTarget { path, handle }))
    }
}

impl<P: DispatchProvider> fmt::Display for PathRepository<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.provider.scheme(), self.prefix)
    }
}

impl<P: DispatchProvider> fmt::Debug for PathRepository<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathRepository")
            .field("scheme", &self.provider.scheme())
            .field("path", &self.path)
            .finish()
    }
}
