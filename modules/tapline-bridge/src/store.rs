use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::types::Document;

/// Named collections of JSON documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Store `payload` unless an equal payload is already in `collection`.
    /// Returns the new document, or `None` for a duplicate.
    async fn insert_if_absent(
        &self,
        collection: &str,
        payload: &serde_json::Value,
    ) -> Result<Option<Document>>;

    async fn contains_payload(&self, collection: &str, payload: &serde_json::Value)
        -> Result<bool>;

    /// Every document in `collection`, oldest first.
    async fn find_all(&self, collection: &str) -> Result<Vec<Document>>;

    async fn find_by_id(&self, collection: &str, id: Uuid) -> Result<Option<Document>>;

    /// Returns whether a document was removed.
    async fn delete_by_id(&self, collection: &str, id: Uuid) -> Result<bool>;
}
