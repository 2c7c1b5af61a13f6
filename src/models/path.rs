//! Hierarchical path values used as repository keys and routing prefixes

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Path separator
pub const SEPARATOR: char = '/';

/// Reasons a string is not a valid path
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("path is empty")]
    Empty,

    #[error("path must begin with a slash (/): {0}")]
    MissingLeadingSlash(String),

    #[error("path contains a NUL character: {0:?}")]
    ContainsNul(String),

    #[error("path contains a \".\" or \"..\" segment: {0}")]
    DotSegment(String),
}

/// A validated path beginning with `/`.
///
/// Trailing separators are allowed in a parsed value; [`PathKey::normalize`]
/// removes them so the value can be used as a lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PathKey(String);

impl PathKey {
    /// Parse and validate a path
    pub fn parse(value: impl Into<String>) -> Result<Self, PathError> {
        let value = value.into();
        validate(&value)?;
        Ok(Self(value))
    }

    /// The root path, `/`
    pub fn root() -> Self {
        Self(SEPARATOR.to_string())
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Strip trailing separators, except when the whole path is the root.
    ///
    /// A path made only of separators normalizes to the root. Normalizing an
    /// already normalized path returns it unchanged.
    pub fn normalize(self) -> Self {
        let trimmed = self.0.trim_end_matches(SEPARATOR);
        if trimmed.len() == self.0.len() || self.is_root() {
            return self;
        }
        if trimmed.is_empty() {
            return Self::root();
        }
        // Dropping trailing separators cannot break any rule in `validate`.
        match Self::parse(trimmed) {
            Ok(path) => path,
            Err(e) => panic!(
                "stripping trailing separators rendered {:?} invalid: {}",
                self.0, e
            ),
        }
    }

    /// True when [`normalize`](Self::normalize) would return the path unchanged
    pub fn is_normalized(&self) -> bool {
        self.is_root() || !self.0.ends_with(SEPARATOR)
    }

    /// The path for direct concatenation: the path itself, or `""` for the root.
    pub fn prefix(&self) -> &str {
        if self.is_root() {
            ""
        } else {
            &self.0
        }
    }

    /// True when `path` is this path or lies below it
    pub fn contains(&self, path: &str) -> bool {
        let prefix = self.prefix();
        match path.strip_prefix(prefix) {
            Some(rest) => rest.is_empty() || rest.starts_with(SEPARATOR),
            None => false,
        }
    }
}

fn validate(value: &str) -> Result<(), PathError> {
    if value.is_empty() {
        return Err(PathError::Empty);
    }
    if !value.starts_with(SEPARATOR) {
        return Err(PathError::MissingLeadingSlash(value.to_string()));
    }
    if value.contains('\0') {
        return Err(PathError::ContainsNul(value.to_string()));
    }
    if value.split(SEPARATOR).any(|segment| segment == "." || segment == "..") {
        return Err(PathError::DotSegment(value.to_string()));
    }
    Ok(())
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PathKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for PathKey {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PathKey {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<PathKey> for String {
    fn from(path: PathKey) -> String {
        path.0
    }
}
