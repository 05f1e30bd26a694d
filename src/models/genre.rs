//! Genre model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Entity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    pub id: Uuid,
    pub name: String,
}

impl Entity for Genre {
    const COLLECTION: &'static str = "genres";

    fn id(&self) -> Uuid {
        self.id
    }

    fn url(&self) -> String {
        format!("/catalog/genre/{}", self.id)
    }
}

/// Genre as shown on pages. `checked` marks the genres selected on a book form.
#[derive(Debug, Clone, Serialize)]
pub struct GenreView {
    #[serde(flatten)]
    pub genre: Genre,
    pub url: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub checked: bool,
}

impl From<Genre> for GenreView {
    fn from(genre: Genre) -> Self {
        Self {
            url: genre.url(),
            checked: false,
            genre,
        }
    }
}
