//! Author model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{format_date, Entity};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: Uuid,
    pub first_name: String,
    pub family_name: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub date_of_death: Option<NaiveDate>,
}

impl Author {
    /// "Family, First"; empty when either part is missing.
    pub fn name(&self) -> String {
        if self.first_name.is_empty() || self.family_name.is_empty() {
            return String::new();
        }
        format!("{}, {}", self.family_name, self.first_name)
    }

    pub fn lifespan(&self) -> String {
        let birth = self.date_of_birth.map(format_date).unwrap_or_default();
        let death = self.date_of_death.map(format_date).unwrap_or_default();
        format!("{} - {}", birth, death)
    }
}

impl Entity for Author {
    const COLLECTION: &'static str = "authors";

    fn id(&self) -> Uuid {
        self.id
    }

    fn url(&self) -> String {
        format!("/catalog/author/{}", self.id)
    }
}

/// Author as shown on pages, with its derived fields
#[derive(Debug, Clone, Serialize)]
pub struct AuthorView {
    #[serde(flatten)]
    pub author: Author,
    pub name: String,
    pub lifespan: String,
    pub url: String,
}

impl From<Author> for AuthorView {
    fn from(author: Author) -> Self {
        Self {
            name: author.name(),
            lifespan: author.lifespan(),
            url: author.url(),
            author,
        }
    }
}
