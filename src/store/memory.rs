//! In-memory document store with the same query semantics as the
//! PostgreSQL backend. Used with `DATABASE_URL=memory://` and in tests.

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    compare_field, matches, project, Document, DocumentStore, Filter, FindOptions, SortOrder,
    StoreError, StoreResult,
};

type Collection = IndexMap<Uuid, Value>;

#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> StoreResult<Vec<Document>> {
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut found: Vec<Document> = docs
            .iter()
            .filter(|(_, body)| matches(body, filter))
            .map(|(id, body)| Document {
                id: *id,
                body: body.clone(),
            })
            .collect();

        // stable sort keeps insertion order among equal keys
        found.sort_by(|a, b| {
            options
                .sort
                .iter()
                .map(|(field, order)| {
                    let ord = compare_field(&a.body, &b.body, field);
                    match order {
                        SortOrder::Asc => ord,
                        SortOrder::Desc => ord.reverse(),
                    }
                })
                .find(|ord| ord.is_ne())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(found
            .into_iter()
            .map(|doc| Document {
                body: project(doc.body, options.projection.as_deref()),
                ..doc
            })
            .collect())
    }

    async fn find_by_id(&self, collection: &str, id: Uuid) -> StoreResult<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(&id))
            .map(|body| Document {
                id,
                body: body.clone(),
            }))
    }

    async fn find_by_ids(&self, collection: &str, ids: &[Uuid]) -> StoreResult<Vec<Document>> {
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(collection) else {
            return Ok(Vec::new());
        };
        Ok(docs
            .iter()
            .filter(|(id, _)| ids.contains(id))
            .map(|(id, body)| Document {
                id: *id,
                body: body.clone(),
            })
            .collect())
    }

    async fn count(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| docs.values().filter(|body| matches(body, filter)).count())
            .unwrap_or(0) as u64)
    }

    async fn insert(&self, collection: &str, document: Document) -> StoreResult<()> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        if docs.contains_key(&document.id) {
            return Err(StoreError::Duplicate {
                collection: collection.to_string(),
                id: document.id,
            });
        }
        docs.insert(document.id, document.body);
        Ok(())
    }

    async fn update_by_id(&self, collection: &str, id: Uuid, body: Value) -> StoreResult<bool> {
        let mut collections = self.collections.write().await;
        match collections.get_mut(collection).and_then(|docs| docs.get_mut(&id)) {
            Some(existing) => {
                *existing = body;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_by_id(&self, collection: &str, id: Uuid) -> StoreResult<bool> {
        let mut collections = self.collections.write().await;
        Ok(collections
            .get_mut(collection)
            .and_then(|docs| docs.shift_remove(&id))
            .is_some())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn close(&self) {}
}
