//! Book configuration parser
//!
//! A book is configured by a flat set of string properties. The schema is
//! closed: every property must be recognized, and any key left over after
//! parsing fails the whole book.
//!
//! Recognized keys:
//!
//! | Key                                   | Meaning                               |
//! |---------------------------------------|---------------------------------------|
//! | `domain`                              | namespace qualifier, default empty    |
//! | `copyright.rightsHolder`              | copyright holder                      |
//! | `copyright.rights`                    | rights statement                      |
//! | `copyright.dateCopyrighted`           | copyright date                        |
//! | `author.<i>.name\|href\|domain\|book\|page` | authors, `i` counting from 1     |
//! | `title`                               | book title                            |
//! | `param.<name>`                        | free-form parameter `<name>`          |
//! | `canonicalBase`                       | base URL for canonical links          |
//! | `content.root`                        | path of the root page (required)      |

use std::collections::HashSet;
use std::path::PathBuf;

use indexmap::{IndexMap, IndexSet};
use thiserror::Error;

use crate::models::{Author, Book, Copyright, PageRef, ParentRef, PathError, PathKey};

const PARAM_PREFIX: &str = "param.";

/// Errors found while parsing a book's properties
#[derive(Error, Debug)]
pub enum BookConfigError {
    #[error("Book name must begin with a slash (/): {0}")]
    InvalidName(String),

    #[error("{book}: invalid {key}: {source}")]
    InvalidPath {
        book: String,
        key: String,
        #[source]
        source: PathError,
    },

    #[error("{book}: missing content.root")]
    MissingContentRoot { book: String },

    #[error("{book}: when author.{index}.domain is provided, both book and page must also be provided")]
    AuthorDomainWithoutBook { book: String, index: usize },

    #[error("{book}: when author.{index}.book is provided, page must also be provided")]
    AuthorBookWithoutPage { book: String, index: usize },

    #[error("{book}: author.{index}.name is required when the author is in a different book: {page}")]
    AuthorNameRequired {
        book: String,
        index: usize,
        page: String,
    },

    #[error("{book}: duplicate author: {author}")]
    DuplicateAuthor { book: String, author: Author },

    #[error("{book}: unused keys: {}", .keys.join(", "))]
    UnusedKeys { book: String, keys: Vec<String> },

    #[error("Duplicate book: {0}")]
    DuplicateBook(String),

    #[error("{book}: {} configuration problems: {}", .problems.len(), join_problems(.problems))]
    Invalid {
        book: String,
        problems: Vec<BookConfigError>,
    },
}

fn join_problems(problems: &[BookConfigError]) -> String {
    problems
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl BookConfigError {
    fn collect(book: &PathKey, mut problems: Vec<BookConfigError>) -> Self {
        if problems.len() == 1 {
            if let Some(problem) = problems.pop() {
                return problem;
            }
        }
        BookConfigError::Invalid {
            book: book.to_string(),
            problems,
        }
    }
}

/// Properties with a record of every key read
struct TrackedProperties<'a> {
    properties: &'a IndexMap<String, String>,
    used: HashSet<&'a str>,
}

impl<'a> TrackedProperties<'a> {
    fn new(properties: &'a IndexMap<String, String>) -> Self {
        Self {
            properties,
            used: HashSet::with_capacity(properties.len()),
        }
    }

    fn get(&mut self, key: &str) -> Option<String> {
        let (key, value) = self.properties.get_key_value(key)?;
        self.used.insert(key.as_str());
        Some(value.clone())
    }

    /// Keys never read, in input order
    fn unused(&self) -> Vec<String> {
        self.properties
            .keys()
            .filter(|key| !self.used.contains(key.as_str()))
            .cloned()
            .collect()
    }
}

/// Expand a leading `~/` against the home directory
fn expand_home(directory: &str) -> PathBuf {
    match (directory.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(directory),
    }
}

/// Parse the properties of the book `name` into a [`Book`].
///
/// All author problems and every unused key are reported together. Nothing
/// is read from `work_directory`.
pub fn parse(
    name: &str,
    work_directory: &str,
    allow_robots: bool,
    parent_refs: IndexSet<ParentRef>,
    properties: &IndexMap<String, String>,
) -> Result<Book, BookConfigError> {
    if !name.starts_with('/') {
        return Err(BookConfigError::InvalidName(name.to_string()));
    }

    let mut props = TrackedProperties::new(properties);
    let mut problems = Vec::new();

    let domain = props.get("domain").unwrap_or_default();
    let name = PathKey::parse(name)
        .map_err(|source| BookConfigError::InvalidPath {
            book: name.to_string(),
            key: "name".to_string(),
            source,
        })?
        .normalize();
    let work_directory = expand_home(work_directory);

    let copyright = Copyright::from_parts(
        props.get("copyright.rightsHolder"),
        props.get("copyright.rights"),
        props.get("copyright.dateCopyrighted"),
    );

    let mut authors = IndexSet::new();
    for index in 1.. {
        let fields = Author {
            name: props.get(&format!("author.{}.name", index)),
            href: props.get(&format!("author.{}.href", index)),
            domain: props.get(&format!("author.{}.domain", index)),
            book: props.get(&format!("author.{}.book", index)),
            page: props.get(&format!("author.{}.page", index)),
        };
        if fields == Author::default() {
            break;
        }
        match resolve_author(&name, &domain, index, fields) {
            Ok(author) => {
                if !authors.insert(author.clone()) {
                    problems.push(BookConfigError::DuplicateAuthor {
                        book: name.to_string(),
                        author,
                    });
                }
            }
            Err(e) => problems.push(e),
        }
    }

    let title = props.get("title");

    let mut param = IndexMap::new();
    for key in properties.keys() {
        if let Some(param_name) = key.strip_prefix(PARAM_PREFIX) {
            if let Some(value) = props.get(key) {
                param.insert(param_name.to_string(), value);
            }
        }
    }

    let canonical_base = props
        .get("canonicalBase")
        .map(|base| base.trim_end_matches('/').to_string())
        .filter(|base| !base.is_empty());

    // The content root refers back to this book, so it is built last.
    let content_root = match props.get("content.root") {
        Some(root) => match PathKey::parse(root) {
            Ok(path) => Some(PageRef::new(domain.clone(), name.clone(), path)),
            Err(source) => {
                problems.push(BookConfigError::InvalidPath {
                    book: name.to_string(),
                    key: "content.root".to_string(),
                    source,
                });
                None
            }
        },
        None => {
            problems.push(BookConfigError::MissingContentRoot {
                book: name.to_string(),
            });
            None
        }
    };

    let unused = props.unused();
    if !unused.is_empty() {
        problems.push(BookConfigError::UnusedKeys {
            book: name.to_string(),
            keys: unused,
        });
    }

    let content_root = match content_root {
        Some(content_root) if problems.is_empty() => content_root,
        _ => return Err(BookConfigError::collect(&name, problems)),
    };

    Ok(Book {
        name,
        domain,
        work_directory,
        parent_refs,
        copyright,
        authors,
        title,
        allow_robots,
        param,
        canonical_base,
        content_root,
    })
}

/// Apply the defaulting and cross-reference rules to one author entry
fn resolve_author(
    book: &PathKey,
    domain: &str,
    index: usize,
    mut author: Author,
) -> Result<Author, BookConfigError> {
    if author.domain.is_some() && author.book.is_none() {
        return Err(BookConfigError::AuthorDomainWithoutBook {
            book: book.to_string(),
            index,
        });
    }
    if author.book.is_some() && author.page.is_none() {
        return Err(BookConfigError::AuthorBookWithoutPage {
            book: book.to_string(),
            index,
        });
    }
    if author.page.is_some() {
        author.domain.get_or_insert_with(|| domain.to_string());
        author.book.get_or_insert_with(|| book.to_string());
    }

    if author.name.is_none() {
        if let Some(author_book) = &author.book {
            let author_domain = author.domain.as_deref().unwrap_or_default();
            if author_domain != domain || author_book != book.as_str() {
                return Err(BookConfigError::AuthorNameRequired {
                    book: book.to_string(),
                    index,
                    page: author.page.clone().unwrap_or_default(),
                });
            }
        }
    }

    Ok(author)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn parse_book(pairs: &[(&str, &str)]) -> Result<Book, BookConfigError> {
        parse("/mybook", "/srv/mybook", false, IndexSet::new(), &props(pairs))
    }

    #[test]
    fn test_minimal_book() {
        let book = parse_book(&[("content.root", "/index")]).unwrap();
        assert_eq!(book.name().as_str(), "/mybook");
        assert_eq!(book.domain(), "");
        assert_eq!(book.title(), None);
        assert!(book.copyright().is_none());
        assert!(book.authors().is_empty());
        assert!(!book.allow_robots());
        assert_eq!(book.content_root().to_string(), "/mybook/index");
        assert_eq!(book.to_string(), "/mybook");
    }

    #[test]
    fn test_full_book() {
        let book = parse(
            "/docs/",
            "/srv/docs",
            true,
            IndexSet::new(),
            &props(&[
                ("domain", "example.com"),
                ("title", "Docs"),
                ("copyright.rightsHolder", "Example"),
                ("copyright.dateCopyrighted", "2016"),
                ("author.1.name", "Ada"),
                ("author.1.href", "https://ada.example"),
                ("param.theme", "dark"),
                ("param.lang", "en"),
                ("canonicalBase", "https://docs.example//"),
                ("content.root", "/index"),
            ]),
        )
        .unwrap();

        assert_eq!(book.name().as_str(), "/docs");
        assert_eq!(book.to_string(), "example.com:/docs");
        assert_eq!(book.title(), Some("Docs"));
        assert!(book.allow_robots());
        assert_eq!(book.work_directory(), std::path::Path::new("/srv/docs"));

        let copyright = book.copyright().unwrap();
        assert_eq!(copyright.rights_holder, "Example");
        assert_eq!(copyright.rights, "");
        assert_eq!(copyright.date_copyrighted, "2016");

        let author = book.authors().first().unwrap();
        assert_eq!(author.name.as_deref(), Some("Ada"));
        assert_eq!(author.book, None);

        let params: Vec<_> = book.param().iter().collect();
        assert_eq!(
            params,
            [
                (&"theme".to_string(), &"dark".to_string()),
                (&"lang".to_string(), &"en".to_string())
            ]
        );
        assert_eq!(book.canonical_base(), Some("https://docs.example"));
        assert_eq!(book.content_root().to_string(), "example.com:/docs/index");
    }

    #[test]
    fn test_name_must_begin_with_slash() {
        assert!(matches!(
            parse("mybook", "/srv", false, IndexSet::new(), &props(&[])),
            Err(BookConfigError::InvalidName(_))
        ));
    }

    #[test]
    fn test_unused_key_is_reported() {
        let err = parse_book(&[
            ("title", "X"),
            ("content.root", "/index"),
            ("unused.key", "Y"),
        ])
        .unwrap_err();

        match err {
            BookConfigError::UnusedKeys { book, keys } => {
                assert_eq!(book, "/mybook");
                assert_eq!(keys, ["unused.key"]);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_all_unused_keys_reported_together() {
        let err = parse_book(&[
            ("content.root", "/index"),
            ("Title", "typo"),
            ("author.1.nmae", "typo"),
            ("copyright", "typo"),
        ])
        .unwrap_err();

        match err {
            BookConfigError::UnusedKeys { keys, .. } => {
                assert_eq!(keys, ["Title", "author.1.nmae", "copyright"]);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_author_page_defaults_to_this_book() {
        let book = parse_book(&[("author.1.page", "/about"), ("content.root", "/index")]).unwrap();

        let author = book.authors().first().unwrap();
        assert_eq!(author.name, None);
        assert_eq!(author.domain.as_deref(), Some(""));
        assert_eq!(author.book.as_deref(), Some("/mybook"));
        assert_eq!(author.page.as_deref(), Some("/about"));
    }

    #[test]
    fn test_author_domain_requires_book() {
        let err = parse_book(&[
            ("author.1.domain", "example.com"),
            ("author.1.page", "/about"),
            ("content.root", "/index"),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            BookConfigError::AuthorDomainWithoutBook { index: 1, .. }
        ));
    }

    #[test]
    fn test_author_book_requires_page() {
        let err = parse_book(&[
            ("author.1.name", "Ada"),
            ("author.1.book", "/other"),
            ("content.root", "/index"),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            BookConfigError::AuthorBookWithoutPage { index: 1, .. }
        ));
    }

    #[test]
    fn test_foreign_author_requires_name() {
        let err = parse_book(&[
            ("author.1.book", "/other"),
            ("author.1.page", "/about"),
            ("content.root", "/index"),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            BookConfigError::AuthorNameRequired { index: 1, .. }
        ));

        let book = parse_book(&[
            ("author.1.name", "Ada"),
            ("author.1.book", "/other"),
            ("author.1.page", "/about"),
            ("content.root", "/index"),
        ])
        .unwrap();
        assert_eq!(book.authors().len(), 1);
    }

    #[test]
    fn test_empty_copyright_is_absent() {
        let book = parse_book(&[("copyright.rights", ""), ("content.root", "/index")]).unwrap();
        assert!(book.copyright().is_none());
    }

    #[test]
    fn test_duplicate_author_rejected() {
        let err = parse_book(&[
            ("author.1.name", "Ada"),
            ("author.1.href", "https://ada.example"),
            ("author.2.name", "Ada"),
            ("author.2.href", "https://ada.example"),
            ("content.root", "/index"),
        ])
        .unwrap_err();
        assert!(matches!(err, BookConfigError::DuplicateAuthor { .. }));
    }

    #[test]
    fn test_author_numbering_stops_at_gap() {
        let err = parse_book(&[
            ("author.1.name", "Ada"),
            ("author.3.name", "Grace"),
            ("content.root", "/index"),
        ])
        .unwrap_err();

        match err {
            BookConfigError::UnusedKeys { keys, .. } => assert_eq!(keys, ["author.3.name"]),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_content_root_required() {
        assert!(matches!(
            parse_book(&[("title", "X")]),
            Err(BookConfigError::MissingContentRoot { .. })
        ));
        assert!(matches!(
            parse_book(&[("content.root", "index")]),
            Err(BookConfigError::InvalidPath { .. })
        ));
    }

    #[test]
    fn test_problems_reported_together() {
        let err = parse_book(&[
            ("author.1.domain", "example.com"),
            ("author.1.page", "/about"),
            ("content.root", "/index"),
            ("extra", "1"),
        ])
        .unwrap_err();

        match &err {
            BookConfigError::Invalid { problems, .. } => {
                assert_eq!(problems.len(), 2);
                assert!(matches!(problems[0], BookConfigError::AuthorDomainWithoutBook { .. }));
                assert!(matches!(problems[1], BookConfigError::UnusedKeys { .. }));
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(err.to_string().contains("2 configuration problems"));
    }

    #[test]
    fn test_canonical_base_collapses_to_none() {
        let book = parse_book(&[("canonicalBase", "///"), ("content.root", "/index")]).unwrap();
        assert_eq!(book.canonical_base(), None);
        let book = parse_book(&[("canonicalBase", ""), ("content.root", "/index")]).unwrap();
        assert_eq!(book.canonical_base(), None);
    }

    #[test]
    fn test_home_directory_expansion() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/books"), home.join("books"));
        }
        assert_eq!(expand_home("/srv/books"), PathBuf::from("/srv/books"));
    }
}
