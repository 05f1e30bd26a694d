//! Repository layer: typed catalog operations on top of the document store

pub mod authors;
pub mod book_instances;
pub mod books;
pub mod genres;

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::Entity,
    store::{Document, DocumentStore, Filter, FindOptions, StoreError, StoreResult},
};

/// Main repository struct holding the document store handle
#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn DocumentStore>,
}

/// Equality filter on a single field.
pub fn by(field: &str, value: impl Into<Value>) -> Filter {
    let mut filter = Filter::new();
    filter.insert(field.to_string(), value.into());
    filter
}

fn id_value(id: Uuid) -> Value {
    Value::String(id.to_string())
}

/// Turn a stored document into `T`, putting the id back into the body.
fn decode<T: DeserializeOwned>(doc: Document) -> StoreResult<T> {
    let mut body = doc.body;
    if let Value::Object(map) = &mut body {
        map.insert("id".to_string(), id_value(doc.id));
    }
    Ok(serde_json::from_value(body)?)
}

fn encode<E: Entity>(entity: &E) -> StoreResult<Document> {
    let mut body = serde_json::to_value(entity)?;
    if let Value::Object(map) = &mut body {
        map.remove("id");
    }
    Ok(Document {
        id: entity.id(),
        body,
    })
}

impl Repository {
    /// Create a new repository over the given store
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub async fn find_by_id<E: Entity>(&self, id: Uuid) -> AppResult<Option<E>> {
        self.store
            .find_by_id(E::COLLECTION, id)
            .await?
            .map(decode)
            .transpose()
            .map_err(Into::into)
    }

    /// Find documents of `collection`, decoded as `T` (an entity or one of
    /// its projections).
    pub async fn find_all<T: DeserializeOwned>(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> AppResult<Vec<T>> {
        let docs = self.store.find(collection, filter, options).await?;
        Ok(docs.into_iter().map(decode).collect::<StoreResult<Vec<T>>>()?)
    }

    pub async fn count<E: Entity>(&self, filter: &Filter) -> AppResult<u64> {
        Ok(self.store.count(E::COLLECTION, filter).await?)
    }

    pub async fn save<E: Entity>(&self, entity: &E) -> AppResult<()> {
        self.store.insert(E::COLLECTION, encode(entity)?).await?;
        Ok(())
    }

    /// Replace the stored entity with the same id; false if there is none.
    pub async fn update<E: Entity>(&self, entity: &E) -> AppResult<bool> {
        let doc = encode(entity)?;
        Ok(self.store.update_by_id(E::COLLECTION, doc.id, doc.body).await?)
    }

    pub async fn delete<E: Entity>(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.store.delete_by_id(E::COLLECTION, id).await?)
    }

    /// Load the referenced entities, keyed by id. Dangling ids are skipped.
    pub async fn expand<E: Entity>(
        &self,
        ids: impl IntoIterator<Item = Uuid>,
    ) -> AppResult<HashMap<Uuid, E>> {
        let mut ids: Vec<Uuid> = ids.into_iter().collect();
        ids.sort();
        ids.dedup();
        let docs = self.store.find_by_ids(E::COLLECTION, &ids).await?;
        docs.into_iter()
            .map(|doc| decode::<E>(doc).map(|e| (e.id(), e)))
            .collect::<Result<HashMap<_, _>, StoreError>>()
            .map_err(Into::into)
    }
}
