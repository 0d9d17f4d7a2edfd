//! Postgres-backed [`DocumentStore`]. Every collection shares one JSONB table.
//!
//! Payload equality is enforced by a unique index on the payload hash, so
//! concurrent drains of the same record cannot both insert it.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use crate::store::DocumentStore;
use crate::types::Document;

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS documents (
        id          UUID PRIMARY KEY,
        seq         BIGSERIAL NOT NULL,
        collection  TEXT NOT NULL,
        payload     JSONB NOT NULL,
        stored_at   TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS documents_collection_payload_key
        ON documents (collection, md5(payload::text))
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS documents_collection_seq_idx
        ON documents (collection, seq)
    "#,
];

#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Create the table and indexes if they are missing.
    pub async fn migrate(&self) -> Result<()> {
        for statement in MIGRATIONS {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        tracing::info!("Document store schema ready");
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn insert_if_absent(
        &self,
        collection: &str,
        payload: &serde_json::Value,
    ) -> Result<Option<Document>> {
        let doc = sqlx::query_as::<_, Document>(
            r#"
            INSERT INTO documents (id, collection, payload)
            VALUES ($1, $2, $3)
            ON CONFLICT DO NOTHING
            RETURNING id, collection, payload, stored_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(collection)
        .bind(payload)
        .fetch_optional(&self.pool)
        .await?;

        Ok(doc)
    }

    async fn contains_payload(
        &self,
        collection: &str,
        payload: &serde_json::Value,
    ) -> Result<bool> {
        let row = sqlx::query_as::<_, (bool,)>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM documents
                WHERE collection = $1 AND md5(payload::text) = md5($2::jsonb::text)
            )
            "#,
        )
        .bind(collection)
        .bind(payload)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.0)
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<Document>> {
        let docs = sqlx::query_as::<_, Document>(
            r#"
            SELECT id, collection, payload, stored_at
            FROM documents
            WHERE collection = $1
            ORDER BY seq ASC
            "#,
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await?;

        Ok(docs)
    }

    async fn find_by_id(&self, collection: &str, id: Uuid) -> Result<Option<Document>> {
        let doc = sqlx::query_as::<_, Document>(
            r#"
            SELECT id, collection, payload, stored_at
            FROM documents
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(doc)
    }

    async fn delete_by_id(&self, collection: &str, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
