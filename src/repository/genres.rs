//! Genre domain methods on Repository

use uuid::Uuid;

use super::{by, Repository};
use crate::{
    error::AppResult,
    models::{Entity, Genre},
    store::{Filter, FindOptions, SortOrder},
};

impl Repository {
    /// All genres, by name
    pub async fn genres_list(&self) -> AppResult<Vec<Genre>> {
        let options = FindOptions::sorted_by("name", SortOrder::Asc);
        self.find_all(Genre::COLLECTION, &Filter::new(), &options).await
    }

    pub async fn genres_get(&self, id: Uuid) -> AppResult<Option<Genre>> {
        self.find_by_id(id).await
    }

    /// Genre whose name is exactly `name`
    pub async fn genres_find_by_name(&self, name: &str) -> AppResult<Option<Genre>> {
        let found: Vec<Genre> = self
            .find_all(Genre::COLLECTION, &by("name", name), &FindOptions::default())
            .await?;
        Ok(found.into_iter().next())
    }
}
