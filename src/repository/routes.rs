//! Handler-backed dispatch
//!
//! The [`RouteTable`] plays the role of a servlet container: handlers are
//! registered at exact paths or mounted over a whole sub-tree, and lookups
//! find the handler responsible for a path.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use super::pages::{DispatchHandle, DispatchProvider, PageHandler};
use crate::{
    error::AppResult,
    models::{path::SEPARATOR, PathKey},
};

#[derive(Default)]
pub struct RouteTable {
    routes: DashMap<String, Arc<dyn PageHandler>>,
    mounts: DashMap<PathKey, Arc<dyn PageHandler>>,
    closed: AtomicBool,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for exactly `path`, replacing any previous one.
    ///
    /// Trailing slashes are stripped, so `/about/` and `/about` are one route.
    pub fn register(&self, path: PathKey, handler: Arc<dyn PageHandler>) {
        let path = path.normalize();
        tracing::debug!("Registered route {}", path);
        self.routes.insert(path.into(), handler);
    }

    /// Register `handler` for `prefix` and every path below it
    pub fn mount(&self, prefix: PathKey, handler: Arc<dyn PageHandler>) {
        let prefix = prefix.normalize();
        tracing::debug!("Mounted handler at {}/*", prefix.prefix());
        self.mounts.insert(prefix, handler);
    }

    /// Stop answering lookups; later queries fail with an I/O error
    pub fn shutdown(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub fn is_shut_down(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn find(&self, path: &str) -> Option<Arc<dyn PageHandler>> {
        // Same key form as `PathKey::normalize`
        let trimmed = path.trim_end_matches(SEPARATOR);
        let exact = if trimmed.is_empty() { "/" } else { trimmed };
        if let Some(handler) = self.routes.get(exact) {
            return Some(handler.value().clone());
        }

        // Longest mount first: walk up the ancestors of `path`.
        let mut candidate = trimmed;
        loop {
            let key = if candidate.is_empty() {
                PathKey::root()
            } else {
                PathKey::parse(candidate).ok()?
            };
            if let Some(handler) = self.mounts.get(&key) {
                return Some(handler.value().clone());
            }
            match candidate.rfind(SEPARATOR) {
                Some(index) if !candidate.is_empty() => candidate = &candidate[..index],
                _ => return None,
            }
        }
    }
}

#[async_trait]
impl DispatchProvider for RouteTable {
    fn scheme(&self) -> &'static str {
        "servlet"
    }

    async fn lookup(&self, path: &str) -> AppResult<Option<DispatchHandle>> {
        if self.is_shut_down() {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "route table is shut down").into());
        }
        Ok(self.find(path).map(DispatchHandle::new))
    }
}
