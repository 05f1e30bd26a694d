//! Book controller

use async_trait::async_trait;
use serde_json::{json, Value};
use uuid::Uuid;

use super::CrudController;
use crate::{
    error::{AppError, AppResult},
    models::{AuthorView, Book, Entity, GenreView},
    repository::Repository,
    store::parse_id,
    validation::{field, FieldError, FormData, ValidationChain},
    views::Page,
};

const LIST_URL: &str = "/catalog/books";

fn book_chain() -> ValidationChain {
    ValidationChain::new(vec![
        field("title").trim().not_empty("Title must not be empty.").escape(),
        field("author")
            .trim()
            .not_empty("Author must not be empty.")
            .escape()
            .uuid("Author must be a valid id."),
        field("summary").trim().not_empty("Summary must not be empty.").escape(),
        field("isbn").trim().not_empty("ISBN must not be empty").escape(),
        field("genre").escape().uuid("Genre must be a valid id."),
    ])
}

/// Build the book from validated form values.
fn book_from_form(id: Uuid, values: &FormData) -> AppResult<Book> {
    let mut genre = Vec::new();
    for raw in values.list("genre") {
        let gid = parse_id(&raw)?;
        if !genre.contains(&gid) {
            genre.push(gid);
        }
    }
    Ok(Book {
        id,
        title: values.text("title"),
        author: parse_id(&values.text("author"))?,
        summary: values.text("summary"),
        isbn: values.text("isbn"),
        genre,
    })
}

#[derive(Clone)]
pub struct BookController {
    repository: Repository,
}

impl BookController {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// The book form with its author and genre choices. `checked` genre ids
    /// are ticked.
    async fn form_page(
        &self,
        title: &str,
        book: Value,
        selected_author: Option<String>,
        checked: &[String],
        errors: Vec<FieldError>,
    ) -> AppResult<Page> {
        let (authors, genres) = tokio::try_join!(
            self.repository.authors_list(),
            self.repository.genres_list(),
        )?;

        let genres: Vec<GenreView> = genres
            .into_iter()
            .map(|genre| {
                let mut view = GenreView::from(genre);
                view.checked = checked.contains(&view.genre.id.to_string());
                view
            })
            .collect();

        Page::render(
            "book_form",
            json!({
                "title": title,
                "authors": authors.into_iter().map(AuthorView::from).collect::<Vec<_>>(),
                "genres": genres,
                "book": book,
                "selected_author": selected_author,
                "errors": errors,
            }),
        )
    }

    async fn rerender(&self, title: &str, values: FormData, errors: Vec<FieldError>) -> AppResult<Page> {
        tracing::debug!(errors = errors.len(), "Book form rejected");
        let checked = values.list("genre");
        let author = values.opt_text("author");
        self.form_page(title, json!(values), author, &checked, errors)
            .await
    }
}

#[async_trait]
impl CrudController for BookController {
    async fn list(&self) -> AppResult<Page> {
        let books = self.repository.books_list().await?;
        Page::render("book_list", json!({ "title": "Book List", "book_list": books }))
    }

    async fn detail(&self, id: Uuid) -> AppResult<Page> {
        let (book, instances) = tokio::try_join!(
            self.repository.books_get_detail(id),
            self.repository.book_instances_by_book(id),
        )?;
        let book = book.ok_or_else(|| AppError::NotFound("Book not found".to_string()))?;

        Page::render(
            "book_detail",
            json!({
                "title": book.title,
                "book": book,
                "book_instances": instances,
            }),
        )
    }

    async fn create_get(&self) -> AppResult<Page> {
        self.form_page("Create Book", Value::Null, None, &[], Vec::new()).await
    }

    async fn create_post(&self, mut form: FormData) -> AppResult<Page> {
        form.normalize_list("genre");
        let values = match book_chain().validate(form) {
            Ok(values) => values,
            Err(invalid) => return self.rerender("Create Book", invalid.values, invalid.errors).await,
        };

        let book = book_from_form(Uuid::new_v4(), &values)?;
        self.repository.save(&book).await?;
        tracing::info!(id = %book.id, "Book created");
        Ok(Page::redirect(book.url()))
    }

    async fn delete_get(&self, id: Uuid) -> AppResult<Page> {
        let (book, instances) = tokio::try_join!(
            self.repository.books_get_detail(id),
            self.repository.book_instances_by_book(id),
        )?;
        let Some(book) = book else {
            return Ok(Page::redirect(LIST_URL));
        };

        Page::render(
            "book_delete",
            json!({
                "title": "Delete Book",
                "book": book,
                "book_instances": instances,
            }),
        )
    }

    async fn delete_post(&self, id: Uuid) -> AppResult<Page> {
        // copies of the book are left in place
        if self.repository.delete::<Book>(id).await? {
            tracing::info!(%id, "Book deleted");
        }
        Ok(Page::redirect(LIST_URL))
    }

    async fn update_get(&self, id: Uuid) -> AppResult<Page> {
        let book = self
            .repository
            .books_get_detail(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))?;

        let checked: Vec<String> = book.genre_ids().iter().map(Uuid::to_string).collect();
        let author = book.author.as_ref().map(|a| a.author.id.to_string());
        let values = json!({
            "title": book.title,
            "author": author,
            "summary": book.summary,
            "isbn": book.isbn,
            "genre": checked,
        });
        self.form_page("Update Book", values, author, &checked, Vec::new()).await
    }

    async fn update_post(&self, id: Uuid, mut form: FormData) -> AppResult<Page> {
        form.normalize_list("genre");
        let values = match book_chain().validate(form) {
            Ok(values) => values,
            Err(invalid) => return self.rerender("Update Book", invalid.values, invalid.errors).await,
        };

        let book = book_from_form(id, &values)?;
        if self.repository.update(&book).await? {
            tracing::info!(%id, "Book updated");
        } else {
            tracing::warn!(%id, "Book to update does not exist");
        }
        Ok(Page::redirect(book.url()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Author, BookInstance, BookInstanceStatus, Genre};
    use crate::store::MemoryStore;
    use std::sync::Arc;

    struct Fixture {
        repo: Repository,
        controller: BookController,
        author: Author,
        genres: Vec<Genre>,
    }

    async fn fixture() -> Fixture {
        let repo = Repository::new(Arc::new(MemoryStore::new()));
        let author = Author {
            id: Uuid::new_v4(),
            first_name: "Ursula".into(),
            family_name: "Le Guin".into(),
            date_of_birth: None,
            date_of_death: None,
        };
        repo.save(&author).await.unwrap();
        let mut genres = Vec::new();
        for name in ["Fantasy", "Science Fiction"] {
            let genre = Genre {
                id: Uuid::new_v4(),
                name: name.into(),
            };
            repo.save(&genre).await.unwrap();
            genres.push(genre);
        }
        Fixture {
            controller: BookController::new(repo.clone()),
            repo,
            author,
            genres,
        }
    }

    fn form(pairs: &[(&str, String)]) -> FormData {
        FormData::from_pairs(pairs.iter().map(|(k, v)| (k.to_string(), v.clone())))
    }

    #[tokio::test]
    async fn valid_create_saves_sanitized_book_and_redirects() {
        let fx = fixture().await;
        let page = fx
            .controller
            .create_post(form(&[
                ("title", "  The Dispossessed ".into()),
                ("author", fx.author.id.to_string()),
                ("summary", "Anarres & Urras".into()),
                ("isbn", "9780061054884".into()),
                ("genre", fx.genres[1].id.to_string()),
            ]))
            .await
            .unwrap();

        let books: Vec<Book> = fx
            .repo
            .find_all(Book::COLLECTION, &Default::default(), &Default::default())
            .await
            .unwrap();
        assert_eq!(books.len(), 1);
        let book = &books[0];
        assert_eq!(book.title, "The Dispossessed");
        assert_eq!(book.summary, "Anarres &amp; Urras");
        assert_eq!(book.author, fx.author.id);
        assert_eq!(book.genre, vec![fx.genres[1].id]);
        assert_eq!(page, Page::redirect(format!("/catalog/book/{}", book.id)));
    }

    #[tokio::test]
    async fn empty_title_rerenders_form_without_saving() {
        let fx = fixture().await;
        let page = fx
            .controller
            .create_post(form(&[
                ("title", "".into()),
                ("author", fx.author.id.to_string()),
                ("summary", "S".into()),
                ("isbn", "123".into()),
                ("genre", fx.genres[0].id.to_string()),
            ]))
            .await
            .unwrap();

        let view = page.view().expect("form should be rendered again");
        assert_eq!(view.name, "book_form");
        assert_eq!(view.data["errors"][0]["message"], "Title must not be empty.");
        assert_eq!(view.data["book"]["summary"], "S");
        assert_eq!(view.data["book"]["isbn"], "123");
        assert_eq!(view.data["selected_author"], fx.author.id.to_string());
        let checked: Vec<bool> = view.data["genres"]
            .as_array()
            .unwrap()
            .iter()
            .map(|g| g["checked"] == json!(true))
            .collect();
        assert_eq!(checked, vec![true, false]);
        assert_eq!(fx.repo.count::<Book>(&Default::default()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn detail_expands_author_genres_and_copies() {
        let fx = fixture().await;
        let book = Book {
            id: Uuid::new_v4(),
            title: "The Lathe of Heaven".into(),
            author: fx.author.id,
            summary: "Dreams".into(),
            isbn: "1".into(),
            genre: vec![fx.genres[1].id, fx.genres[0].id],
        };
        fx.repo.save(&book).await.unwrap();
        fx.repo
            .save(&BookInstance {
                id: Uuid::new_v4(),
                book: book.id,
                imprint: "Avon, 1973".into(),
                status: BookInstanceStatus::Available,
                due_back: None,
            })
            .await
            .unwrap();

        let page = fx.controller.detail(book.id).await.unwrap();
        let data = &page.view().unwrap().data;
        assert_eq!(data["title"], "The Lathe of Heaven");
        assert_eq!(data["book"]["author"]["name"], "Le Guin, Ursula");
        assert_eq!(data["book"]["genre"][0]["name"], "Science Fiction");
        assert_eq!(data["book"]["genre"][1]["name"], "Fantasy");
        assert_eq!(data["book_instances"][0]["imprint"], "Avon, 1973");
    }

    #[tokio::test]
    async fn unknown_book_is_not_found() {
        let fx = fixture().await;
        let err = fx.controller.detail(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(msg) if msg == "Book not found"));
        assert!(fx.controller.update_get(Uuid::new_v4()).await.is_err());
    }

    #[tokio::test]
    async fn update_keeps_the_id_and_redirects_to_detail() {
        let fx = fixture().await;
        let id = Uuid::new_v4();
        fx.repo
            .save(&Book {
                id,
                title: "Old".into(),
                author: fx.author.id,
                summary: "S".into(),
                isbn: "1".into(),
                genre: vec![fx.genres[0].id],
            })
            .await
            .unwrap();

        let edit = fx.controller.update_get(id).await.unwrap();
        let data = &edit.view().unwrap().data;
        assert_eq!(data["title"], "Update Book");
        assert_eq!(data["book"]["title"], "Old");
        assert_eq!(data["genres"][0]["checked"], true);

        let page = fx
            .controller
            .update_post(
                id,
                form(&[
                    ("title", "New".into()),
                    ("author", fx.author.id.to_string()),
                    ("summary", "S".into()),
                    ("isbn", "1".into()),
                ]),
            )
            .await
            .unwrap();
        assert_eq!(page.redirect_target(), Some(format!("/catalog/book/{}", id).as_str()));
        let book = fx.repo.books_get(id).await.unwrap().unwrap();
        assert_eq!(book.title, "New");
        assert!(book.genre.is_empty());
    }

    #[tokio::test]
    async fn delete_of_unknown_book_redirects_to_list() {
        let fx = fixture().await;
        let id = Uuid::new_v4();
        assert_eq!(fx.controller.delete_get(id).await.unwrap(), Page::redirect(LIST_URL));
        assert_eq!(fx.controller.delete_post(id).await.unwrap(), Page::redirect(LIST_URL));
    }

    #[tokio::test]
    async fn list_is_sorted_by_title_with_authors() {
        let fx = fixture().await;
        for title in ["Tehanu", "A Wizard of Earthsea"] {
            fx.repo
                .save(&Book {
                    id: Uuid::new_v4(),
                    title: title.into(),
                    author: fx.author.id,
                    summary: "S".into(),
                    isbn: "1".into(),
                    genre: vec![],
                })
                .await
                .unwrap();
        }
        let page = fx.controller.list().await.unwrap();
        let list = &page.view().unwrap().data["book_list"];
        assert_eq!(list[0]["title"], "A Wizard of Earthsea");
        assert_eq!(list[1]["title"], "Tehanu");
        assert_eq!(list[1]["author"]["family_name"], "Le Guin");
    }

    fn errors(page: &Page) -> Vec<(String, String)> {
        page.view().unwrap().data["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| {
                (
                    e["field"].as_str().unwrap().to_string(),
                    e["message"].as_str().unwrap().to_string(),
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn empty_title_and_placeholder_author_get_their_own_messages() {
        let fx = fixture().await;
        let page = fx
            .controller
            .create_post(form(&[
                ("title", "".into()),
                ("author", "A1".into()),
                ("summary", "S".into()),
                ("isbn", "123".into()),
            ]))
            .await
            .unwrap();

        assert_eq!(page.view().unwrap().name, "book_form");
        assert_eq!(
            errors(&page),
            vec![
                ("title".to_string(), "Title must not be empty.".to_string()),
                ("author".to_string(), "Author must be a valid id.".to_string()),
            ]
        );
        assert_eq!(fx.repo.count::<Book>(&Default::default()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn invalid_update_leaves_the_book_unchanged() {
        let fx = fixture().await;
        let original = Book {
            id: Uuid::new_v4(),
            title: "Old".into(),
            author: fx.author.id,
            summary: "S".into(),
            isbn: "1".into(),
            genre: vec![fx.genres[0].id],
        };
        fx.repo.save(&original).await.unwrap();

        let page = fx
            .controller
            .update_post(
                original.id,
                form(&[
                    ("title", "   ".into()),
                    ("author", fx.author.id.to_string()),
                    ("summary", "New summary".into()),
                    ("isbn", "2".into()),
                ]),
            )
            .await
            .unwrap();

        let view = page.view().unwrap();
        assert_eq!(view.name, "book_form");
        assert_eq!(view.data["title"], "Update Book");
        assert_eq!(errors(&page), vec![("title".to_string(), "Title must not be empty.".to_string())]);
        assert_eq!(view.data["book"]["summary"], "New summary");
        assert_eq!(fx.repo.books_get(original.id).await.unwrap(), Some(original));
    }
}
