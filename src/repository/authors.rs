//! Author domain methods on Repository

use uuid::Uuid;

use super::Repository;
use crate::{
    error::AppResult,
    models::{Author, Entity},
    store::{Filter, FindOptions, SortOrder},
};

impl Repository {
    /// All authors, by family name then first name
    pub async fn authors_list(&self) -> AppResult<Vec<Author>> {
        let options = FindOptions::sorted_by("family_name", SortOrder::Asc)
            .then_by("first_name", SortOrder::Asc);
        self.find_all(Author::COLLECTION, &Filter::new(), &options).await
    }

    pub async fn authors_get(&self, id: Uuid) -> AppResult<Option<Author>> {
        self.find_by_id(id).await
    }
}
