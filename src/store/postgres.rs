use async_trait::async_trait;
use serde_json::Value;
use sqlx::types::Json;
use uuid::Uuid;

use super::{with_id, DocumentEdit, DocumentStore, Filter};
use crate::{
    database::{self, DatabasePool},
    error::ApiError,
};

/// Document store on a single PostgreSQL `documents` table.
///
/// Each row holds one JSON document in a JSONB column tagged with its
/// collection name; equality filters become JSONB containment (`@>`).
pub struct PgDocumentStore {
    pool: DatabasePool,
}

impl PgDocumentStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Connect, run migrations and wrap the resulting pool.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, ApiError> {
        let pool = database::create_connection_pool(database_url, max_connections).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn insert(&self, collection: &str, document: Value) -> Result<Value, ApiError> {
        let id = Uuid::new_v4();
        let document = with_id(document, id)?;

        sqlx::query(
            r#"
            INSERT INTO documents (id, collection, body)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(id)
        .bind(collection)
        .bind(Json(&document))
        .execute(&self.pool)
        .await?;

        Ok(document)
    }

    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Value>,
    ) -> Result<Vec<Value>, ApiError> {
        let stored = documents
            .into_iter()
            .map(|doc| with_id(doc, Uuid::new_v4()))
            .collect::<Result<Vec<_>, _>>()?;

        let mut tx = self.pool.begin().await?;
        for document in &stored {
            let id = document
                .get(super::ID_FIELD)
                .and_then(Value::as_str)
                .and_then(|raw| Uuid::parse_str(raw).ok())
                .ok_or_else(|| ApiError::internal("document id missing after stamping"))?;

            sqlx::query(
                r#"
                INSERT INTO documents (id, collection, body)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(id)
            .bind(collection)
            .bind(Json(document))
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        Ok(stored)
    }

    async fn find_by_id(&self, collection: &str, id: &Uuid) -> Result<Option<Value>, ApiError> {
        let row: Option<(Json<Value>,)> = sqlx::query_as(
            r#"
            SELECT body
            FROM documents
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(Json(body),)| body))
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Value>, ApiError> {
        let rows: Vec<(Json<Value>,)> = sqlx::query_as(
            r#"
            SELECT body
            FROM documents
            WHERE collection = $1 AND body @> $2
            ORDER BY seq ASC
            "#,
        )
        .bind(collection)
        .bind(Json(filter.to_json()))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(Json(body),)| body).collect())
    }

    async fn update_by_id(
        &self,
        collection: &str,
        id: &Uuid,
        document: Value,
    ) -> Result<Option<Value>, ApiError> {
        let document = with_id(document, *id)?;

        let result = sqlx::query(
            r#"
            UPDATE documents
            SET body = $3, updated_at = NOW()
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(Json(&document))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(Some(document))
    }

    async fn modify_by_id(
        &self,
        collection: &str,
        id: &Uuid,
        edit: DocumentEdit<'_>,
    ) -> Result<Option<Value>, ApiError> {
        let mut tx = self.pool.begin().await?;

        // Row lock held until commit; concurrent edits of this id queue here.
        let row: Option<(Json<Value>,)> = sqlx::query_as(
            r#"
            SELECT body
            FROM documents
            WHERE collection = $1 AND id = $2
            FOR UPDATE
            "#,
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((Json(current),)) = row else {
            return Ok(None);
        };
        let document = with_id(edit(current)?, *id)?;

        sqlx::query(
            r#"
            UPDATE documents
            SET body = $3, updated_at = NOW()
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(Json(&document))
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(Some(document))
    }

    async fn delete_by_id(&self, collection: &str, id: &Uuid) -> Result<bool, ApiError> {
        let result = sqlx::query(
            r#"
            DELETE FROM documents
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64, ApiError> {
        let result = sqlx::query(
            r#"
            DELETE FROM documents
            WHERE collection = $1 AND body @> $2
            "#,
        )
        .bind(collection)
        .bind(Json(filter.to_json()))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), ApiError> {
        database::health_check(&self.pool).await
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
