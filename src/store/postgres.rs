//! PostgreSQL document store: every collection lives in the `documents`
//! table as JSONB bodies.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, types::Json, Pool, Postgres};
use uuid::Uuid;

use super::{
    project, Document, DocumentStore, Filter, FindOptions, SortOrder, StoreError, StoreResult,
};
use crate::config::DatabaseConfig;

#[derive(Clone)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &DatabaseConfig) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect(&config.url)
            .await?;
        tracing::info!("Connected to database");
        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Database migrations completed");
        Ok(())
    }
}

/// `ORDER BY` clause for the sort keys; key names are bound starting at `$first`.
fn order_clause(sort: &[(String, SortOrder)], first: usize) -> String {
    let mut keys: Vec<String> = sort
        .iter()
        .enumerate()
        .map(|(i, (_, order))| match order {
            SortOrder::Asc => format!("body ->> ${} ASC NULLS FIRST", first + i),
            SortOrder::Desc => format!("body ->> ${} DESC NULLS LAST", first + i),
        })
        .collect();
    // natural (insertion) order breaks ties
    keys.push("created_at".to_string());
    keys.join(", ")
}

fn into_document((id, Json(body)): (Uuid, Json<Value>)) -> Document {
    Document { id, body }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> StoreResult<Vec<Document>> {
        let query = format!(
            "SELECT id, body FROM documents WHERE collection = $1 AND body @> $2 ORDER BY {}",
            order_clause(&options.sort, 3)
        );

        let mut builder = sqlx::query_as::<_, (Uuid, Json<Value>)>(&query)
            .bind(collection)
            .bind(Json(Value::Object(filter.clone())));
        for (field, _) in &options.sort {
            builder = builder.bind(field);
        }

        let rows = builder.fetch_all(&self.pool).await?;
        Ok(rows
            .into_iter()
            .map(into_document)
            .map(|doc| Document {
                body: project(doc.body, options.projection.as_deref()),
                ..doc
            })
            .collect())
    }

    async fn find_by_id(&self, collection: &str, id: Uuid) -> StoreResult<Option<Document>> {
        let row = sqlx::query_as::<_, (Uuid, Json<Value>)>(
            "SELECT id, body FROM documents WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(into_document))
    }

    async fn find_by_ids(&self, collection: &str, ids: &[Uuid]) -> StoreResult<Vec<Document>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, (Uuid, Json<Value>)>(
            "SELECT id, body FROM documents WHERE collection = $1 AND id = ANY($2) ORDER BY created_at",
        )
        .bind(collection)
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(into_document).collect())
    }

    async fn count(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM documents WHERE collection = $1 AND body @> $2",
        )
        .bind(collection)
        .bind(Json(Value::Object(filter.clone())))
        .fetch_one(&self.pool)
        .await?;
        Ok(count.max(0) as u64)
    }

    async fn insert(&self, collection: &str, document: Document) -> StoreResult<()> {
        sqlx::query("INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3)")
            .bind(collection)
            .bind(document.id)
            .bind(Json(document.body))
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Duplicate {
                    collection: collection.to_string(),
                    id: document.id,
                },
                e => e.into(),
            })?;
        Ok(())
    }

    async fn update_by_id(&self, collection: &str, id: Uuid, body: Value) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE documents SET body = $3, updated_at = NOW() WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .bind(Json(body))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_id(&self, collection: &str, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
