//! Genre controller

use async_trait::async_trait;
use serde_json::{json, Value};
use uuid::Uuid;

use super::CrudController;
use crate::{
    error::{AppError, AppResult},
    models::{Entity, Genre, GenreView},
    repository::Repository,
    validation::{field, FieldError, FormData, ValidationChain},
    views::Page,
};

const LIST_URL: &str = "/catalog/genres";

fn genre_chain() -> ValidationChain {
    ValidationChain::new(vec![field("name")
        .trim()
        .min_length(3, "Genre name must contain at least 3 characters")
        .max_length(100, "Genre name must not exceed 100 characters")
        .escape()])
}

#[derive(Clone)]
pub struct GenreController {
    repository: Repository,
}

impl GenreController {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    fn form_page(title: &str, genre: Value, errors: Vec<FieldError>) -> AppResult<Page> {
        Page::render(
            "genre_form",
            json!({
                "title": title,
                "genre": genre,
                "errors": errors,
            }),
        )
    }

    async fn with_books(&self, id: Uuid) -> AppResult<Option<(GenreView, Value)>> {
        let (genre, books) = tokio::try_join!(
            self.repository.genres_get(id),
            self.repository.books_by_genre(id),
        )?;
        Ok(genre.map(|genre| (GenreView::from(genre), json!(books))))
    }
}

#[async_trait]
impl CrudController for GenreController {
    async fn list(&self) -> AppResult<Page> {
        let genres: Vec<GenreView> = self
            .repository
            .genres_list()
            .await?
            .into_iter()
            .map(GenreView::from)
            .collect();
        Page::render("genre_list", json!({ "title": "Genre List", "genre_list": genres }))
    }

    async fn detail(&self, id: Uuid) -> AppResult<Page> {
        let (genre, books) = self
            .with_books(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Genre not found".to_string()))?;
        Page::render(
            "genre_detail",
            json!({
                "title": "Genre Detail",
                "genre": genre,
                "genre_books": books,
            }),
        )
    }

    async fn create_get(&self) -> AppResult<Page> {
        Self::form_page("Create Genre", Value::Null, Vec::new())
    }

    async fn create_post(&self, form: FormData) -> AppResult<Page> {
        let values = match genre_chain().validate(form) {
            Ok(values) => values,
            Err(invalid) => {
                tracing::debug!(errors = invalid.errors.len(), "Genre form rejected");
                return Self::form_page("Create Genre", json!(invalid.values), invalid.errors);
            }
        };

        let name = values.text("name");
        if let Some(existing) = self.repository.genres_find_by_name(&name).await? {
            return Ok(Page::redirect(existing.url()));
        }

        let genre = Genre {
            id: Uuid::new_v4(),
            name,
        };
        self.repository.save(&genre).await?;
        tracing::info!(id = %genre.id, "Genre created");
        Ok(Page::redirect(genre.url()))
    }

    async fn delete_get(&self, id: Uuid) -> AppResult<Page> {
        let Some((genre, books)) = self.with_books(id).await? else {
            return Ok(Page::redirect(LIST_URL));
        };
        Page::render(
            "genre_delete",
            json!({
                "title": "Delete Genre",
                "genre": genre,
                "genre_books": books,
            }),
        )
    }

    async fn delete_post(&self, id: Uuid) -> AppResult<Page> {
        if self.repository.delete::<Genre>(id).await? {
            tracing::info!(%id, "Genre deleted");
        }
        Ok(Page::redirect(LIST_URL))
    }

    async fn update_get(&self, id: Uuid) -> AppResult<Page> {
        let genre = self
            .repository
            .genres_get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Genre not found".to_string()))?;
        Self::form_page("Update Genre", json!(genre), Vec::new())
    }

    async fn update_post(&self, id: Uuid, form: FormData) -> AppResult<Page> {
        let values = match genre_chain().validate(form) {
            Ok(values) => values,
            Err(invalid) => {
                tracing::debug!(errors = invalid.errors.len(), "Genre form rejected");
                return Self::form_page("Update Genre", json!(invalid.values), invalid.errors);
            }
        };

        let genre = Genre {
            id,
            name: values.text("name"),
        };
        if self.repository.update(&genre).await? {
            tracing::info!(%id, "Genre updated");
        } else {
            tracing::warn!(%id, "Genre to update does not exist");
        }
        Ok(Page::redirect(genre.url()))
    }
}
