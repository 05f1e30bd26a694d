//! Book instance (copy) controller

use async_trait::async_trait;
use serde_json::{json, Value};
use uuid::Uuid;

use super::CrudController;
use crate::{
    error::{AppError, AppResult},
    models::{BookInstance, BookInstanceStatus, Entity},
    repository::Repository,
    store::parse_id,
    validation::{field, parse_date, FieldError, FormData, ValidationChain},
    views::Page,
};

const LIST_URL: &str = "/catalog/bookinstances";

fn book_instance_chain() -> ValidationChain {
    ValidationChain::new(vec![
        field("book")
            .trim()
            .not_empty("Book must be specified")
            .escape()
            .uuid("Book must be a valid id."),
        field("imprint").trim().not_empty("Imprint must be specified").escape(),
        field("status")
            .optional()
            .trim()
            .escape()
            .one_of(BookInstanceStatus::names(), "Invalid status"),
        field("due_back").optional().date("Invalid date"),
    ])
}

fn instance_from_form(id: Uuid, values: &FormData) -> AppResult<BookInstance> {
    let status = match values.opt_text("status") {
        Some(status) => status.parse().map_err(AppError::Internal)?,
        None => BookInstanceStatus::default(),
    };
    Ok(BookInstance {
        id,
        book: parse_id(&values.text("book"))?,
        imprint: values.text("imprint"),
        status,
        due_back: values.opt_text("due_back").as_deref().and_then(parse_date),
    })
}

#[derive(Clone)]
pub struct BookInstanceController {
    repository: Repository,
}

impl BookInstanceController {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    async fn form_page(
        &self,
        title: &str,
        bookinstance: Value,
        selected_book: Option<String>,
        errors: Vec<FieldError>,
    ) -> AppResult<Page> {
        let books = self.repository.books_titles().await?;
        Page::render(
            "bookinstance_form",
            json!({
                "title": title,
                "book_list": books,
                "statuses": BookInstanceStatus::names(),
                "selected_book": selected_book,
                "bookinstance": bookinstance,
                "errors": errors,
            }),
        )
    }

    async fn rerender(&self, title: &str, values: FormData, errors: Vec<FieldError>) -> AppResult<Page> {
        tracing::debug!(errors = errors.len(), "Book instance form rejected");
        let selected = values.opt_text("book");
        self.form_page(title, json!(values), selected, errors).await
    }
}

#[async_trait]
impl CrudController for BookInstanceController {
    async fn list(&self) -> AppResult<Page> {
        let instances = self.repository.book_instances_list().await?;
        Page::render(
            "bookinstance_list",
            json!({ "title": "Book Instance List", "bookinstance_list": instances }),
        )
    }

    async fn detail(&self, id: Uuid) -> AppResult<Page> {
        let instance = self
            .repository
            .book_instances_get_detail(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Book copy not found".to_string()))?;
        let title = instance
            .book
            .as_ref()
            .map(|book| book.title.as_str())
            .unwrap_or_default();

        Page::render(
            "bookinstance_detail",
            json!({
                "title": format!("Copy: {}", title),
                "bookinstance": instance,
            }),
        )
    }

    async fn create_get(&self) -> AppResult<Page> {
        self.form_page("Create BookInstance", Value::Null, None, Vec::new()).await
    }

    async fn create_post(&self, form: FormData) -> AppResult<Page> {
        let values = match book_instance_chain().validate(form) {
            Ok(values) => values,
            Err(invalid) => {
                return self
                    .rerender("Create BookInstance", invalid.values, invalid.errors)
                    .await
            }
        };

        let instance = instance_from_form(Uuid::new_v4(), &values)?;
        self.repository.save(&instance).await?;
        tracing::info!(id = %instance.id, book = %instance.book, "Book instance created");
        Ok(Page::redirect(instance.url()))
    }

    async fn delete_get(&self, id: Uuid) -> AppResult<Page> {
        let Some(instance) = self.repository.book_instances_get_detail(id).await? else {
            return Ok(Page::redirect(LIST_URL));
        };
        Page::render(
            "bookinstance_delete",
            json!({
                "title": "Delete BookInstance",
                "bookinstance": instance,
            }),
        )
    }

    async fn delete_post(&self, id: Uuid) -> AppResult<Page> {
        if self.repository.delete::<BookInstance>(id).await? {
            tracing::info!(%id, "Book instance deleted");
        }
        Ok(Page::redirect(LIST_URL))
    }

    async fn update_get(&self, id: Uuid) -> AppResult<Page> {
        let instance = self
            .repository
            .book_instances_get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Bookinstance not found".to_string()))?;
        let selected = Some(instance.book.to_string());
        self.form_page("Update BookInstance", json!(instance), selected, Vec::new())
            .await
    }

    async fn update_post(&self, id: Uuid, form: FormData) -> AppResult<Page> {
        let values = match book_instance_chain().validate(form) {
            Ok(values) => values,
            Err(invalid) => {
                return self
                    .rerender("Update BookInstance", invalid.values, invalid.errors)
                    .await
            }
        };

        let instance = instance_from_form(id, &values)?;
        if self.repository.update(&instance).await? {
            tracing::info!(%id, "Book instance updated");
        } else {
            tracing::warn!(%id, "Book instance to update does not exist");
        }
        Ok(Page::redirect(instance.url()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Book;
    use crate::store::MemoryStore;
    use chrono::NaiveDate;
    use std::sync::Arc;

    async fn with_book() -> (Repository, BookInstanceController, Book) {
        let repo = Repository::new(Arc::new(MemoryStore::new()));
        let book = Book {
            id: Uuid::new_v4(),
            title: "Middlemarch".into(),
            author: Uuid::new_v4(),
            summary: "Provincial life".into(),
            isbn: "1".into(),
            genre: vec![],
        };
        repo.save(&book).await.unwrap();
        (repo.clone(), BookInstanceController::new(repo), book)
    }

    fn form(pairs: &[(&str, String)]) -> FormData {
        FormData::from_pairs(pairs.iter().map(|(k, v)| (k.to_string(), v.clone())))
    }

    #[tokio::test]
    async fn missing_status_defaults_to_maintenance() {
        let (repo, controller, book) = with_book().await;
        let page = controller
            .create_post(form(&[
                ("book", book.id.to_string()),
                ("imprint", "Penguin, 1994".into()),
                ("status", "".into()),
                ("due_back", "".into()),
            ]))
            .await
            .unwrap();

        let instances = repo.book_instances_by_book(book.id).await.unwrap();
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].status, BookInstanceStatus::Maintenance);
        assert_eq!(instances[0].due_back, None);
        assert_eq!(page.redirect_target(), Some(instances[0].url.as_str()));
    }

    #[tokio::test]
    async fn detail_title_names_the_book() {
        let (repo, controller, book) = with_book().await;
        let instance = BookInstance {
            id: Uuid::new_v4(),
            book: book.id,
            imprint: "Penguin".into(),
            status: BookInstanceStatus::Loaned,
            due_back: NaiveDate::from_ymd_opt(2024, 3, 9),
        };
        repo.save(&instance).await.unwrap();

        let page = controller.detail(instance.id).await.unwrap();
        let data = &page.view().unwrap().data;
        assert_eq!(data["title"], "Copy: Middlemarch");
        assert_eq!(data["bookinstance"]["status"], "Loaned");
        assert_eq!(data["bookinstance"]["due_back_formatted"], "Mar 9, 2024");
    }

    #[tokio::test]
    async fn invalid_status_and_date_are_reported() {
        let (repo, controller, book) = with_book().await;
        let page = controller
            .create_post(form(&[
                ("book", book.id.to_string()),
                ("imprint", "".into()),
                ("status", "Lost".into()),
                ("due_back", "next week".into()),
            ]))
            .await
            .unwrap();

        let view = page.view().unwrap();
        assert_eq!(view.name, "bookinstance_form");
        let messages: Vec<_> = view.data["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["message"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(messages, vec!["Imprint must be specified", "Invalid status", "Invalid date"]);
        assert_eq!(view.data["selected_book"], book.id.to_string());
        assert_eq!(view.data["book_list"][0]["title"], "Middlemarch");
        assert!(repo.book_instances_list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_get_of_unknown_copy() {
        let (_, controller, _) = with_book().await;
        let err = controller.update_get(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(msg) if msg == "Bookinstance not found"));
    }

    #[tokio::test]
    async fn list_expands_books_and_delete_removes() {
        let (repo, controller, book) = with_book().await;
        let id = Uuid::new_v4();
        repo.save(&BookInstance {
            id,
            book: book.id,
            imprint: "Penguin".into(),
            status: BookInstanceStatus::Available,
            due_back: None,
        })
        .await
        .unwrap();

        let page = controller.list().await.unwrap();
        assert_eq!(
            page.view().unwrap().data["bookinstance_list"][0]["book"]["title"],
            "Middlemarch"
        );

        assert_eq!(controller.delete_post(id).await.unwrap(), Page::redirect(LIST_URL));
        assert!(repo.book_instances_get(id).await.unwrap().is_none());
    }

    fn copy_of(book: &Book) -> BookInstance {
        BookInstance {
            id: Uuid::new_v4(),
            book: book.id,
            imprint: "Penguin".into(),
            status: BookInstanceStatus::Available,
            due_back: None,
        }
    }

    #[tokio::test]
    async fn book_that_is_not_an_id_is_reported() {
        let (_, controller, _) = with_book().await;
        let page = controller
            .create_post(form(&[("book", "B1".into()), ("imprint", "Penguin".into())]))
            .await
            .unwrap();
        let errors = &page.view().unwrap().data["errors"];
        assert_eq!(errors.as_array().unwrap().len(), 1);
        assert_eq!(errors[0]["field"], "book");
        assert_eq!(errors[0]["message"], "Book must be a valid id.");
    }

    #[tokio::test]
    async fn update_replaces_status_and_due_date() {
        let (repo, controller, book) = with_book().await;
        let copy = copy_of(&book);
        repo.save(&copy).await.unwrap();

        let page = controller
            .update_post(
                copy.id,
                form(&[
                    ("book", book.id.to_string()),
                    ("imprint", "Penguin".into()),
                    ("status", "Loaned".into()),
                    ("due_back", "2024-05-01".into()),
                ]),
            )
            .await
            .unwrap();

        assert_eq!(page, Page::redirect(copy.url()));
        let stored = repo.book_instances_get(copy.id).await.unwrap().unwrap();
        assert_eq!(stored.status, BookInstanceStatus::Loaned);
        assert_eq!(stored.due_back, NaiveDate::from_ymd_opt(2024, 5, 1));
    }

    #[tokio::test]
    async fn invalid_update_leaves_the_copy_unchanged() {
        let (repo, controller, book) = with_book().await;
        let copy = copy_of(&book);
        repo.save(&copy).await.unwrap();

        let page = controller
            .update_post(
                copy.id,
                form(&[
                    ("book", book.id.to_string()),
                    ("imprint", " ".into()),
                    ("status", "Reserved".into()),
                ]),
            )
            .await
            .unwrap();

        let view = page.view().unwrap();
        assert_eq!(view.name, "bookinstance_form");
        assert_eq!(view.data["title"], "Update BookInstance");
        assert_eq!(view.data["errors"][0]["message"], "Imprint must be specified");
        assert_eq!(view.data["bookinstance"]["status"], "Reserved");
        assert_eq!(view.data["selected_book"], book.id.to_string());
        assert_eq!(repo.book_instances_get(copy.id).await.unwrap(), Some(copy));
    }
}
