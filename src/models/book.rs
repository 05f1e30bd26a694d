//! Book model and its expanded read models

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AuthorView, Entity, GenreView};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    /// Author id
    pub author: Uuid,
    pub summary: String,
    pub isbn: String,
    /// Genre ids
    #[serde(default)]
    pub genre: Vec<Uuid>,
}

impl Entity for Book {
    const COLLECTION: &'static str = "books";

    fn id(&self) -> Uuid {
        self.id
    }

    fn url(&self) -> String {
        format!("/catalog/book/{}", self.id)
    }
}

fn book_url(id: Uuid) -> String {
    format!("/catalog/book/{}", id)
}

/// `title` projection, used for choice lists
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookTitle {
    pub id: Uuid,
    pub title: String,
}

impl BookTitle {
    pub fn url(&self) -> String {
        book_url(self.id)
    }
}

/// `title summary` projection, listed on author and genre pages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookSummary {
    pub id: Uuid,
    pub title: String,
    pub summary: String,
    #[serde(default)]
    pub url: String,
}

/// Book list row: title with the author expanded
#[derive(Debug, Clone, Serialize)]
pub struct BookListEntry {
    pub id: Uuid,
    pub title: String,
    pub author: Option<AuthorView>,
    pub url: String,
}

/// Book with its author and genres expanded
#[derive(Debug, Clone, Serialize)]
pub struct BookDetail {
    pub id: Uuid,
    pub title: String,
    pub author: Option<AuthorView>,
    pub summary: String,
    pub isbn: String,
    pub genre: Vec<GenreView>,
    pub url: String,
}

impl BookDetail {
    pub fn genre_ids(&self) -> Vec<Uuid> {
        self.genre.iter().map(|g| g.genre.id).collect()
    }
}
