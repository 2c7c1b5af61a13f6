//! Author model

use std::fmt;

use serde::{Deserialize, Serialize};

/// An author of a book.
///
/// An author may be a plain name, a link, or a reference to an author page,
/// possibly in another book.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Author {
    pub name: Option<String>,
    pub href: Option<String>,
    pub domain: Option<String>,
    pub book: Option<String>,
    pub page: Option<String>,
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            return f.write_str(name);
        }
        if let Some(page) = &self.page {
            if let Some(domain) = self.domain.as_deref().filter(|d| !d.is_empty()) {
                write!(f, "{}:", domain)?;
            }
            return write!(f, "{}{}", self.book.as_deref().unwrap_or_default(), page);
        }
        f.write_str(self.href.as_deref().unwrap_or("(anonymous)"))
    }
}
