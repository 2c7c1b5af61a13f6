//! Book loading service

use std::path::Path;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use super::book_config::{self, BookConfigError};
use crate::{
    config::{BookSource, LibraryConfig, ParentSource},
    error::AppResult,
    models::{Book, PageRef, ParentRef, PathKey},
    repository::WorkDirectory,
};

/// A loaded book with the source files backing its pages
#[derive(Clone)]
pub struct BookEntry {
    pub book: Arc<Book>,
    pub pages: Arc<WorkDirectory>,
}

/// Every book of the library, in configuration order
#[derive(Clone, Default)]
pub struct BookService {
    books: Arc<IndexMap<PathKey, BookEntry>>,
}

impl BookService {
    /// Load and parse every configured book.
    ///
    /// Fails on the first book that cannot be read or parsed.
    pub async fn load(config: &LibraryConfig) -> AppResult<Self> {
        let mut books = Vec::with_capacity(config.books.len());
        for source in &config.books {
            let book = load_book(source).await?;
            tracing::info!(
                "Loaded book {} ({} authors) from {}",
                book,
                book.authors().len(),
                source.properties.display()
            );
            books.push(book);
        }
        Self::from_books(books)
    }

    /// Build the service from already parsed books
    pub fn from_books(books: impl IntoIterator<Item = Book>) -> AppResult<Self> {
        let mut entries = IndexMap::new();
        for book in books {
            let name = book.name().clone();
            let pages = Arc::new(WorkDirectory::new(name.clone(), book.work_directory()));
            let entry = BookEntry {
                book: Arc::new(book),
                pages,
            };
            if entries.insert(name.clone(), entry).is_some() {
                return Err(BookConfigError::DuplicateBook(name.to_string()).into());
            }
        }
        Ok(Self {
            books: Arc::new(entries),
        })
    }

    pub fn get(&self, name: &PathKey) -> Option<&BookEntry> {
        self.books.get(name)
    }

    pub fn list(&self) -> impl Iterator<Item = &Arc<Book>> {
        self.books.values().map(|entry| &entry.book)
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// The book with the longest name containing `path`
    pub fn find_for_path(&self, path: &str) -> Option<&BookEntry> {
        self.books
            .iter()
            .filter(|(name, _)| name.contains(path))
            .max_by_key(|(name, _)| name.prefix().len())
            .map(|(_, entry)| entry)
    }
}

async fn load_book(source: &BookSource) -> AppResult<Book> {
    let properties = read_properties(&source.properties).await?;
    let parent_refs = source
        .parents
        .iter()
        .map(parent_ref)
        .collect::<AppResult<IndexSet<_>>>()?;

    Ok(book_config::parse(
        &source.name,
        &source.work_directory,
        source.allow_robots,
        parent_refs,
        &properties,
    )?)
}

/// Read a flat JSON object of string properties, keeping key order
async fn read_properties(path: &Path) -> AppResult<IndexMap<String, String>> {
    let bytes = tokio::fs::read(path).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn parent_ref(source: &ParentSource) -> AppResult<ParentRef> {
    let book = PathKey::parse(source.book.as_str())?.normalize();
    let page = PathKey::parse(source.page.as_str())?;
    Ok(ParentRef {
        page: PageRef::new(source.domain.clone(), book, page),
        short_title: source.short_title.clone(),
    })
}
