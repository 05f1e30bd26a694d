//! Document store client.
//!
//! Collections hold JSON object bodies keyed by a UUID. The repository layer
//! speaks only to [`DocumentStore`]; the backend is picked from the database
//! URL when the server starts.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::config::DatabaseConfig;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cast to id failed for value \"{0}\"")]
    InvalidId(String),

    #[error("Duplicate id {id} in {collection}")]
    Duplicate { collection: String, id: Uuid },

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A stored document: its id and its JSON object body (without the id).
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: Uuid,
    pub body: Value,
}

/// Containment filter: every key must be present in the body with an equal
/// value, except arrays, which only need to contain the given elements.
/// `{}` matches everything.
pub type Filter = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    pub sort: Vec<(String, SortOrder)>,
    /// Keep only these top-level fields of the body
    pub projection: Option<Vec<String>>,
}

impl FindOptions {
    pub fn sorted_by(field: &str, order: SortOrder) -> Self {
        Self {
            sort: vec![(field.to_string(), order)],
            projection: None,
        }
    }

    pub fn then_by(mut self, field: &str, order: SortOrder) -> Self {
        self.sort.push((field.to_string(), order));
        self
    }

    pub fn project(mut self, fields: &[&str]) -> Self {
        self.projection = Some(fields.iter().map(|f| f.to_string()).collect());
        self
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> StoreResult<Vec<Document>>;

    async fn find_by_id(&self, collection: &str, id: Uuid) -> StoreResult<Option<Document>>;

    async fn find_by_ids(&self, collection: &str, ids: &[Uuid]) -> StoreResult<Vec<Document>>;

    async fn count(&self, collection: &str, filter: &Filter) -> StoreResult<u64>;

    async fn insert(&self, collection: &str, document: Document) -> StoreResult<()>;

    /// Replace the body of an existing document. Returns false when no
    /// document has that id.
    async fn update_by_id(&self, collection: &str, id: Uuid, body: Value) -> StoreResult<bool>;

    /// Returns false when no document has that id.
    async fn delete_by_id(&self, collection: &str, id: Uuid) -> StoreResult<bool>;

    async fn ping(&self) -> StoreResult<()>;

    async fn close(&self);
}

/// Open the store selected by `config.url`.
pub async fn connect(config: &DatabaseConfig) -> StoreResult<Arc<dyn DocumentStore>> {
    if config.url.starts_with("memory:") {
        tracing::warn!("Using the in-memory document store; data is lost on shutdown");
        return Ok(Arc::new(MemoryStore::new()));
    }
    let store = PgStore::connect(config).await?;
    store.migrate().await?;
    Ok(Arc::new(store))
}

/// Parse a document id coming from a URL or a form field.
pub fn parse_id(raw: &str) -> StoreResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| StoreError::InvalidId(raw.to_string()))
}

/// `true` when `value` contains `pattern` with JSONB `@>` semantics.
pub fn contains(value: &Value, pattern: &Value) -> bool {
    match (value, pattern) {
        (Value::Object(value), Value::Object(pattern)) => pattern
            .iter()
            .all(|(key, p)| value.get(key).is_some_and(|v| contains(v, p))),
        (Value::Array(value), Value::Array(pattern)) => pattern
            .iter()
            .all(|p| value.iter().any(|v| contains(v, p))),
        // a scalar in the pattern also matches an array holding it
        (Value::Array(value), scalar) => value.iter().any(|v| v == scalar),
        (value, pattern) => value == pattern,
    }
}

pub fn matches(body: &Value, filter: &Filter) -> bool {
    filter
        .iter()
        .all(|(key, p)| body.get(key).is_some_and(|v| contains(v, p)))
}

/// Keep only the projected top-level fields of a body.
pub fn project(body: Value, fields: Option<&[String]>) -> Value {
    match (body, fields) {
        (Value::Object(mut map), Some(fields)) => {
            map.retain(|key, _| fields.iter().any(|f| f == key));
            Value::Object(map)
        }
        (body, _) => body,
    }
}

/// Order two bodies by one field; missing and null values sort first.
pub fn compare_field(a: &Value, b: &Value, field: &str) -> Ordering {
    let key = |v: &Value| -> Option<String> {
        match v.get(field) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        }
    };
    key(a).cmp(&key(b))
}
