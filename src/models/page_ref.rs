//! References to pages within books

use std::fmt;

use serde::{Deserialize, Serialize};

use super::path::PathKey;

/// A page addressed by domain, book and path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRef {
    pub domain: String,
    pub book: PathKey,
    pub path: PathKey,
}

impl PageRef {
    pub fn new(domain: impl Into<String>, book: PathKey, path: PathKey) -> Self {
        Self {
            domain: domain.into(),
            book,
            path,
        }
    }

    /// Book prefix and page path joined, as used for request routing
    pub fn service_path(&self) -> String {
        format!("{}{}", self.book.prefix(), self.path)
    }
}

impl fmt::Display for PageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.domain.is_empty() {
            write!(f, "{}:", self.domain)?;
        }
        f.write_str(&self.service_path())
    }
}

/// A parent page of a book's content root
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParentRef {
    pub page: PageRef,
    pub short_title: Option<String>,
}
