//! Catalog controllers: one per entity plus the home page dashboard.
//!
//! Controllers hold no request state. Each call validates its input, reads
//! what it needs (concurrently when there is more than one read), then either
//! persists and redirects or renders a [`Page`].

pub mod aggregate;
pub mod authors;
pub mod book_instances;
pub mod books;
pub mod catalog;
pub mod genres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{error::AppResult, repository::Repository, validation::FormData, views::Page};

/// The handler set every catalog entity exposes
#[async_trait]
pub trait CrudController: Send + Sync {
    /// All entities, sorted, with references expanded
    async fn list(&self) -> AppResult<Page>;

    /// One entity; `AppError::NotFound` when the id is unknown
    async fn detail(&self, id: Uuid) -> AppResult<Page>;

    async fn create_get(&self) -> AppResult<Page>;

    /// Re-renders the form on invalid input, otherwise saves and redirects
    /// to the new entity.
    async fn create_post(&self, form: FormData) -> AppResult<Page>;

    /// Confirmation page; unknown ids redirect to the list.
    async fn delete_get(&self, id: Uuid) -> AppResult<Page>;

    /// Deletes by id and redirects to the list. Unknown ids are a no-op.
    async fn delete_post(&self, id: Uuid) -> AppResult<Page>;

    async fn update_get(&self, id: Uuid) -> AppResult<Page>;

    /// Like `create_post`, but replaces the entity with this id.
    async fn update_post(&self, id: Uuid, form: FormData) -> AppResult<Page>;
}

/// Container for all controllers
#[derive(Clone)]
pub struct Services {
    pub repository: Repository,
    pub catalog: catalog::CatalogController,
    pub books: books::BookController,
    pub authors: authors::AuthorController,
    pub genres: genres::GenreController,
    pub book_instances: book_instances::BookInstanceController,
}

impl Services {
    /// Create all controllers over the given repository
    pub fn new(repository: Repository) -> Self {
        Self {
            catalog: catalog::CatalogController::new(repository.clone()),
            books: books::BookController::new(repository.clone()),
            authors: authors::AuthorController::new(repository.clone()),
            genres: genres::GenreController::new(repository.clone()),
            book_instances: book_instances::BookInstanceController::new(repository.clone()),
            repository,
        }
    }
}
