//! Author controller

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{json, Value};
use uuid::Uuid;

use super::CrudController;
use crate::{
    error::{AppError, AppResult},
    models::{Author, AuthorView, Entity},
    repository::Repository,
    validation::{field, parse_date, FieldError, FormData, ValidationChain},
    views::Page,
};

const LIST_URL: &str = "/catalog/authors";

fn author_chain() -> ValidationChain {
    ValidationChain::new(vec![
        field("first_name")
            .trim()
            .not_empty("First name must be specified.")
            .max_length(100, "First name must not exceed 100 characters.")
            .alphanumeric("First name has non-alphanumeric characters.")
            .escape(),
        field("family_name")
            .trim()
            .not_empty("Family name must be specified.")
            .max_length(100, "Family name must not exceed 100 characters.")
            .alphanumeric("Family name has non-alphanumeric characters.")
            .escape(),
        field("date_of_birth").optional().date("Invalid date of birth"),
        field("date_of_death").optional().date("Invalid date of death"),
    ])
}

fn date_field(values: &FormData, name: &str) -> Option<NaiveDate> {
    values.opt_text(name).as_deref().and_then(parse_date)
}

fn author_from_form(id: Uuid, values: &FormData) -> Author {
    Author {
        id,
        first_name: values.text("first_name"),
        family_name: values.text("family_name"),
        date_of_birth: date_field(values, "date_of_birth"),
        date_of_death: date_field(values, "date_of_death"),
    }
}

#[derive(Clone)]
pub struct AuthorController {
    repository: Repository,
}

impl AuthorController {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    fn form_page(title: &str, author: Value, errors: Vec<FieldError>) -> AppResult<Page> {
        Page::render(
            "author_form",
            json!({
                "title": title,
                "author": author,
                "errors": errors,
            }),
        )
    }

    /// The author with the books written by them, for the detail and
    /// delete pages.
    async fn with_books(&self, id: Uuid) -> AppResult<Option<(AuthorView, Value)>> {
        let (author, books) = tokio::try_join!(
            self.repository.authors_get(id),
            self.repository.books_by_author(id),
        )?;
        Ok(author.map(|author| (AuthorView::from(author), json!(books))))
    }
}

#[async_trait]
impl CrudController for AuthorController {
    async fn list(&self) -> AppResult<Page> {
        let authors: Vec<AuthorView> = self
            .repository
            .authors_list()
            .await?
            .into_iter()
            .map(AuthorView::from)
            .collect();
        Page::render("author_list", json!({ "title": "Author List", "author_list": authors }))
    }

    async fn detail(&self, id: Uuid) -> AppResult<Page> {
        let (author, books) = self
            .with_books(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Author not found".to_string()))?;
        Page::render(
            "author_detail",
            json!({
                "title": "Author Detail",
                "author": author,
                "author_books": books,
            }),
        )
    }

    async fn create_get(&self) -> AppResult<Page> {
        Self::form_page("Create Author", Value::Null, Vec::new())
    }

    async fn create_post(&self, form: FormData) -> AppResult<Page> {
        let values = match author_chain().validate(form) {
            Ok(values) => values,
            Err(invalid) => {
                tracing::debug!(errors = invalid.errors.len(), "Author form rejected");
                return Self::form_page("Create Author", json!(invalid.values), invalid.errors);
            }
        };

        let author = author_from_form(Uuid::new_v4(), &values);
        self.repository.save(&author).await?;
        tracing::info!(id = %author.id, "Author created");
        Ok(Page::redirect(author.url()))
    }

    async fn delete_get(&self, id: Uuid) -> AppResult<Page> {
        let Some((author, books)) = self.with_books(id).await? else {
            return Ok(Page::redirect(LIST_URL));
        };
        Page::render(
            "author_delete",
            json!({
                "title": "Delete Author",
                "author": author,
                "author_books": books,
            }),
        )
    }

    async fn delete_post(&self, id: Uuid) -> AppResult<Page> {
        if self.repository.delete::<Author>(id).await? {
            tracing::info!(%id, "Author deleted");
        }
        Ok(Page::redirect(LIST_URL))
    }

    async fn update_get(&self, id: Uuid) -> AppResult<Page> {
        let author = self
            .repository
            .authors_get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Author not found".to_string()))?;
        Self::form_page("Update Author", json!(author), Vec::new())
    }

    async fn update_post(&self, id: Uuid, form: FormData) -> AppResult<Page> {
        let values = match author_chain().validate(form) {
            Ok(values) => values,
            Err(invalid) => {
                tracing::debug!(errors = invalid.errors.len(), "Author form rejected");
                return Self::form_page("Update Author", json!(invalid.values), invalid.errors);
            }
        };

        let author = author_from_form(id, &values);
        if self.repository.update(&author).await? {
            tracing::info!(%id, "Author updated");
        } else {
            tracing::warn!(%id, "Author to update does not exist");
        }
        Ok(Page::redirect(author.url()))
    }
}
