//! Book instance (physical copy) model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::{format_date, BookTitle, Entity};

/// Circulation status of a copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BookInstanceStatus {
    Available,
    #[default]
    Maintenance,
    Loaned,
    Reserved,
}

impl BookInstanceStatus {
    pub const ALL: [BookInstanceStatus; 4] = [
        BookInstanceStatus::Available,
        BookInstanceStatus::Maintenance,
        BookInstanceStatus::Loaned,
        BookInstanceStatus::Reserved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookInstanceStatus::Available => "Available",
            BookInstanceStatus::Maintenance => "Maintenance",
            BookInstanceStatus::Loaned => "Loaned",
            BookInstanceStatus::Reserved => "Reserved",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|s| s.as_str()).collect()
    }
}

impl fmt::Display for BookInstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BookInstanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown status {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookInstance {
    pub id: Uuid,
    /// Book id
    pub book: Uuid,
    pub imprint: String,
    #[serde(default)]
    pub status: BookInstanceStatus,
    #[serde(default)]
    pub due_back: Option<NaiveDate>,
}

impl Entity for BookInstance {
    const COLLECTION: &'static str = "bookinstances";

    fn id(&self) -> Uuid {
        self.id
    }

    fn url(&self) -> String {
        format!("/catalog/bookinstance/{}", self.id)
    }
}

/// Copy with its book expanded (title only)
#[derive(Debug, Clone, Serialize)]
pub struct BookInstanceDetail {
    pub id: Uuid,
    pub book: Option<BookRef>,
    pub imprint: String,
    pub status: BookInstanceStatus,
    pub due_back: Option<NaiveDate>,
    pub due_back_formatted: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookRef {
    pub id: Uuid,
    pub title: String,
    pub url: String,
}

impl From<BookTitle> for BookRef {
    fn from(book: BookTitle) -> Self {
        Self {
            url: book.url(),
            id: book.id,
            title: book.title,
        }
    }
}

impl BookInstanceDetail {
    pub fn new(instance: BookInstance, book: Option<BookTitle>) -> Self {
        Self {
            url: instance.url(),
            due_back_formatted: instance.due_back.map(format_date).unwrap_or_default(),
            id: instance.id,
            book: book.map(BookRef::from),
            imprint: instance.imprint,
            status: instance.status,
            due_back: instance.due_back,
        }
    }
}
