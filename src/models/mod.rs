//! Data models for the catalog

pub mod author;
pub mod book;
pub mod book_instance;
pub mod genre;

use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

// Re-export commonly used types
pub use author::{Author, AuthorView};
pub use book::{Book, BookDetail, BookListEntry, BookSummary, BookTitle};
pub use book_instance::{BookInstance, BookInstanceDetail, BookInstanceStatus, BookRef};
pub use genre::{Genre, GenreView};

/// A document kept in its own collection.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: &'static str;

    fn id(&self) -> Uuid;

    /// Canonical detail page URL
    fn url(&self) -> String;
}

/// `Mon D, YYYY`, the way dates are shown on pages.
pub fn format_date(date: chrono::NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}
