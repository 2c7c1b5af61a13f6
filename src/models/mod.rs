//! Data models for Folio

pub mod author;
pub mod book;
pub mod copyright;
pub mod page_ref;
pub mod path;

// Re-export commonly used types
pub use author::Author;
pub use book::{Book, BookSummary};
pub use copyright::Copyright;
pub use page_ref::{PageRef, ParentRef};
pub use path::{PathError, PathKey};
