//! Home page dashboard

use serde_json::json;

use super::aggregate::{parallel, Tasks};
use crate::{
    error::AppResult,
    models::{Author, Book, BookInstance, BookInstanceStatus, Genre},
    repository::Repository,
    store::Filter,
    views::Page,
};

#[derive(Clone)]
pub struct CatalogController {
    repository: Repository,
}

impl CatalogController {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Counts of every collection, read concurrently
    pub async fn index(&self) -> AppResult<Page> {
        let all = Filter::new();
        let repo = &self.repository;

        let tasks = Tasks::new()
            .add("book_count", repo.count::<Book>(&all))
            .add("book_instance_count", repo.count::<BookInstance>(&all))
            .add(
                "book_instance_available_count",
                repo.book_instances_count_by_status(BookInstanceStatus::Available),
            )
            .add("author_count", repo.count::<Author>(&all))
            .add("genre_count", repo.count::<Genre>(&all));
        let counts = parallel(tasks).await?;

        Page::render(
            "index",
            json!({
                "title": "Local Library Home",
                "data": counts,
            }),
        )
    }
}
