//! Book model
//!
//! A book is built once by [`book_config::parse`](crate::services::book_config::parse)
//! and never modified afterwards.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use super::{author::Author, copyright::Copyright, page_ref::PageRef, page_ref::ParentRef, path::PathKey};

/// A named collection of content pages
#[derive(Debug, Clone)]
pub struct Book {
    pub(crate) name: PathKey,
    pub(crate) domain: String,
    pub(crate) work_directory: PathBuf,
    pub(crate) parent_refs: IndexSet<ParentRef>,
    pub(crate) copyright: Option<Copyright>,
    pub(crate) authors: IndexSet<Author>,
    pub(crate) title: Option<String>,
    pub(crate) allow_robots: bool,
    pub(crate) param: IndexMap<String, String>,
    pub(crate) canonical_base: Option<String>,
    pub(crate) content_root: PageRef,
}

impl Book {
    pub fn name(&self) -> &PathKey {
        &self.name
    }

    /// Namespace qualifier, empty when the book is in the local domain
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Working copy holding the page sources
    pub fn work_directory(&self) -> &Path {
        &self.work_directory
    }

    pub fn parent_refs(&self) -> &IndexSet<ParentRef> {
        &self.parent_refs
    }

    pub fn copyright(&self) -> Option<&Copyright> {
        debug_assert!(self.copyright.as_ref().map_or(true, |c| !c.is_empty()));
        self.copyright.as_ref()
    }

    pub fn authors(&self) -> &IndexSet<Author> {
        &self.authors
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn allow_robots(&self) -> bool {
        self.allow_robots
    }

    pub fn param(&self) -> &IndexMap<String, String> {
        &self.param
    }

    /// Base URL for canonical links, without trailing slash
    pub fn canonical_base(&self) -> Option<&str> {
        self.canonical_base.as_deref()
    }

    pub fn content_root(&self) -> &PageRef {
        &self.content_root
    }

    pub fn summary(&self) -> BookSummary {
        BookSummary {
            id: self.to_string(),
            name: self.name.to_string(),
            domain: self.domain.clone(),
            title: self.title.clone(),
            allow_robots: self.allow_robots,
            canonical_base: self.canonical_base.clone(),
            content_root: self.content_root.to_string(),
            copyright: self.copyright.clone(),
            authors: self.authors.iter().cloned().collect(),
            param: self.param.clone(),
        }
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.domain.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}:{}", self.domain, self.name)
        }
    }
}

impl PartialEq for Book {
    fn eq(&self, other: &Self) -> bool {
        self.domain == other.domain && self.name == other.name
    }
}

impl Eq for Book {}

impl Hash for Book {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.domain.hash(state);
        self.name.hash(state);
    }
}

/// Book description returned by the API
#[derive(Debug, Clone, Serialize)]
pub struct BookSummary {
    pub id: String,
    pub name: String,
    pub domain: String,
    pub title: Option<String>,
    pub allow_robots: bool,
    pub canonical_base: Option<String>,
    pub content_root: String,
    pub copyright: Option<Copyright>,
    pub authors: Vec<Author>,
    pub param: IndexMap<String, String>,
}
