//! Book domain methods on Repository

use serde::Deserialize;
use uuid::Uuid;

use super::{by, id_value, Repository};
use crate::{
    error::AppResult,
    models::{
        Author, AuthorView, Book, BookDetail, BookListEntry, BookSummary, BookTitle, Entity,
        Genre, GenreView,
    },
    store::{Filter, FindOptions, SortOrder},
};

/// `title author` projection
#[derive(Deserialize)]
struct BookTitleAuthor {
    id: Uuid,
    title: String,
    author: Uuid,
}

impl Repository {
    /// All books sorted by title, with their author expanded
    pub async fn books_list(&self) -> AppResult<Vec<BookListEntry>> {
        let options = FindOptions::sorted_by("title", SortOrder::Asc).project(&["title", "author"]);
        let books: Vec<BookTitleAuthor> = self
            .find_all(Book::COLLECTION, &Filter::new(), &options)
            .await?;

        let authors = self.expand::<Author>(books.iter().map(|b| b.author)).await?;

        Ok(books
            .into_iter()
            .map(|b| BookListEntry {
                url: format!("/catalog/book/{}", b.id),
                id: b.id,
                title: b.title,
                author: authors.get(&b.author).cloned().map(AuthorView::from),
            })
            .collect())
    }

    pub async fn books_get(&self, id: Uuid) -> AppResult<Option<Book>> {
        self.find_by_id(id).await
    }

    /// A book with its author and genres expanded
    pub async fn books_get_detail(&self, id: Uuid) -> AppResult<Option<BookDetail>> {
        let Some(book) = self.find_by_id::<Book>(id).await? else {
            return Ok(None);
        };

        let (author, genres) = tokio::try_join!(
            self.find_by_id::<Author>(book.author),
            self.expand::<Genre>(book.genre.iter().copied()),
        )?;

        Ok(Some(BookDetail {
            url: book.url(),
            id: book.id,
            title: book.title,
            author: author.map(AuthorView::from),
            summary: book.summary,
            isbn: book.isbn,
            // keep the order stored on the book
            genre: book
                .genre
                .iter()
                .filter_map(|gid| genres.get(gid).cloned())
                .map(GenreView::from)
                .collect(),
        }))
    }

    /// Titles of all books, for choice lists
    pub async fn books_titles(&self) -> AppResult<Vec<BookTitle>> {
        let options = FindOptions::sorted_by("title", SortOrder::Asc).project(&["title"]);
        self.find_all(Book::COLLECTION, &Filter::new(), &options).await
    }

    pub async fn books_by_author(&self, author_id: Uuid) -> AppResult<Vec<BookSummary>> {
        self.book_summaries(by("author", id_value(author_id))).await
    }

    pub async fn books_by_genre(&self, genre_id: Uuid) -> AppResult<Vec<BookSummary>> {
        self.book_summaries(by("genre", vec![id_value(genre_id)])).await
    }

    async fn book_summaries(&self, filter: Filter) -> AppResult<Vec<BookSummary>> {
        let options = FindOptions::sorted_by("title", SortOrder::Asc).project(&["title", "summary"]);
        let mut books: Vec<BookSummary> = self.find_all(Book::COLLECTION, &filter, &options).await?;
        for book in &mut books {
            book.url = format!("/catalog/book/{}", book.id);
        }
        Ok(books)
    }
}
