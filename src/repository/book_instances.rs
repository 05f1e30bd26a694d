//! Book instance domain methods on Repository

use uuid::Uuid;

use super::{by, id_value, Repository};
use crate::{
    error::AppResult,
    models::{Book, BookInstance, BookInstanceDetail, BookInstanceStatus, BookTitle, Entity},
    store::{Filter, FindOptions},
};

impl Repository {
    /// All copies with their book expanded
    pub async fn book_instances_list(&self) -> AppResult<Vec<BookInstanceDetail>> {
        let instances: Vec<BookInstance> = self
            .find_all(BookInstance::COLLECTION, &Filter::new(), &FindOptions::default())
            .await?;
        let books = self.expand_titles(instances.iter().map(|i| i.book)).await?;

        Ok(instances
            .into_iter()
            .map(|instance| {
                let book = books.iter().find(|b| b.id == instance.book).cloned();
                BookInstanceDetail::new(instance, book)
            })
            .collect())
    }

    pub async fn book_instances_get(&self, id: Uuid) -> AppResult<Option<BookInstance>> {
        self.find_by_id(id).await
    }

    /// A copy with its book expanded
    pub async fn book_instances_get_detail(&self, id: Uuid) -> AppResult<Option<BookInstanceDetail>> {
        let Some(instance) = self.find_by_id::<BookInstance>(id).await? else {
            return Ok(None);
        };
        let book = self.expand_titles([instance.book]).await?.into_iter().next();
        Ok(Some(BookInstanceDetail::new(instance, book)))
    }

    /// Copies of one book
    pub async fn book_instances_by_book(&self, book_id: Uuid) -> AppResult<Vec<BookInstanceDetail>> {
        let instances: Vec<BookInstance> = self
            .find_all(
                BookInstance::COLLECTION,
                &by("book", id_value(book_id)),
                &FindOptions::default(),
            )
            .await?;
        Ok(instances
            .into_iter()
            .map(|instance| BookInstanceDetail::new(instance, None))
            .collect())
    }

    pub async fn book_instances_count_by_status(&self, status: BookInstanceStatus) -> AppResult<u64> {
        self.count::<BookInstance>(&by("status", status.as_str())).await
    }

    async fn expand_titles(&self, ids: impl IntoIterator<Item = Uuid>) -> AppResult<Vec<BookTitle>> {
        let books = self.expand::<Book>(ids).await?;
        Ok(books
            .into_values()
            .map(|b| BookTitle {
                id: b.id,
                title: b.title,
            })
            .collect())
    }
}
