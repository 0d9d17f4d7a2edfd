//! In-process bus and store for tests and broker-less local runs.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use async_trait::async_trait;
use uuid::Uuid;

use crate::store::DocumentStore;
use crate::topic::{TopicBus, TopicLocks};
use crate::types::{Document, TopicMessage};

#[derive(Default)]
struct TopicLog {
    messages: Vec<serde_json::Value>,
    /// Next offset the group has not committed.
    committed: usize,
}

/// Per-topic append-only log with a single consumer group.
///
/// `poll` always returns the first uncommitted message, so an unacknowledged
/// message is redelivered until it is committed.
#[derive(Default)]
pub struct MemoryBus {
    topics: Mutex<HashMap<String, TopicLog>>,
    locks: TopicLocks,
}

impl MemoryBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages published to `topic` and not yet committed.
    pub fn pending(&self, topic: &str) -> usize {
        let topics = self.topics.lock().unwrap_or_else(|e| e.into_inner());
        topics
            .get(topic)
            .map(|log| log.messages.len() - log.committed)
            .unwrap_or(0)
    }

    /// Every message ever published to `topic`.
    pub fn published(&self, topic: &str) -> Vec<serde_json::Value> {
        let topics = self.topics.lock().unwrap_or_else(|e| e.into_inner());
        topics
            .get(topic)
            .map(|log| log.messages.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TopicBus for MemoryBus {
    async fn publish(&self, topic: &str, payload: &serde_json::Value) -> Result<()> {
        let mut topics = self.topics.lock().unwrap_or_else(|e| e.into_inner());
        topics
            .entry(topic.to_string())
            .or_default()
            .messages
            .push(payload.clone());
        Ok(())
    }

    async fn poll(&self, topic: &str) -> Result<Option<TopicMessage>> {
        let topics = self.topics.lock().unwrap_or_else(|e| e.into_inner());
        let Some(log) = topics.get(topic) else {
            return Ok(None);
        };
        Ok(log.messages.get(log.committed).map(|payload| TopicMessage {
            topic: topic.to_string(),
            partition: 0,
            offset: log.committed as i64,
            payload: payload.clone(),
        }))
    }

    async fn commit(&self, message: &TopicMessage) -> Result<()> {
        let mut topics = self.topics.lock().unwrap_or_else(|e| e.into_inner());
        let Some(log) = topics.get_mut(&message.topic) else {
            bail!("commit on unknown topic {}", message.topic);
        };
        let next = message.offset as usize + 1;
        if next > log.messages.len() {
            bail!(
                "commit past end of {} (offset {})",
                message.topic,
                message.offset
            );
        }
        log.committed = log.committed.max(next);
        Ok(())
    }

    async fn release(&self, _message: &TopicMessage) -> Result<()> {
        // Uncommitted messages are redelivered already.
        Ok(())
    }

    fn read_lock(&self, topic: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.locks.get(topic)
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Collections kept in insertion order.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: Mutex<HashMap<String, Vec<Document>>>,
    fail_writes: bool,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `insert_if_absent` return an error.
    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn len(&self, collection: &str) -> usize {
        let collections = self.collections.lock().unwrap_or_else(|e| e.into_inner());
        collections.get(collection).map(Vec::len).unwrap_or(0)
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn insert_if_absent(
        &self,
        collection: &str,
        payload: &serde_json::Value,
    ) -> Result<Option<Document>> {
        if self.fail_writes {
            bail!("MemoryDocumentStore: writes disabled");
        }
        let mut collections = self.collections.lock().unwrap_or_else(|e| e.into_inner());
        let docs = collections.entry(collection.to_string()).or_default();
        if docs.iter().any(|d| &d.payload == payload) {
            return Ok(None);
        }
        let doc = Document::new(collection, payload.clone());
        docs.push(doc.clone());
        Ok(Some(doc))
    }

    async fn contains_payload(
        &self,
        collection: &str,
        payload: &serde_json::Value,
    ) -> Result<bool> {
        let collections = self.collections.lock().unwrap_or_else(|e| e.into_inner());
        Ok(collections
            .get(collection)
            .is_some_and(|docs| docs.iter().any(|d| &d.payload == payload)))
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<Document>> {
        let collections = self.collections.lock().unwrap_or_else(|e| e.into_inner());
        Ok(collections.get(collection).cloned().unwrap_or_default())
    }

    async fn find_by_id(&self, collection: &str, id: Uuid) -> Result<Option<Document>> {
        let collections = self.collections.lock().unwrap_or_else(|e| e.into_inner());
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| d.id == id).cloned()))
    }

    async fn delete_by_id(&self, collection: &str, id: Uuid) -> Result<bool> {
        let mut collections = self.collections.lock().unwrap_or_else(|e| e.into_inner());
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(false);
        };
        let before = docs.len();
        docs.retain(|d| d.id != id);
        Ok(docs.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn uncommitted_message_is_redelivered() {
        let bus = MemoryBus::new();
        bus.publish("t", &json!({"a": 1})).await.unwrap();
        bus.publish("t", &json!({"a": 2})).await.unwrap();

        let first = bus.poll("t").await.unwrap().unwrap();
        let again = bus.poll("t").await.unwrap().unwrap();
        assert_eq!(first, again);

        bus.commit(&first).await.unwrap();
        let second = bus.poll("t").await.unwrap().unwrap();
        assert_eq!(second.payload, json!({"a": 2}));
        assert_eq!(bus.pending("t"), 1);
    }

    #[tokio::test]
    async fn unknown_topic_polls_empty() {
        let bus = MemoryBus::new();
        assert!(bus.poll("nothing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn commit_past_end_is_rejected() {
        let bus = MemoryBus::new();
        bus.publish("t", &json!(1)).await.unwrap();
        let bogus = TopicMessage {
            topic: "t".into(),
            partition: 0,
            offset: 5,
            payload: json!(1),
        };
        assert!(bus.commit(&bogus).await.is_err());
    }

    #[tokio::test]
    async fn store_rejects_equal_payloads() {
        let store = MemoryDocumentStore::new();
        let payload = json!([{"brand": "Nike"}]);

        let doc = store.insert_if_absent("c", &payload).await.unwrap();
        assert!(doc.is_some());
        assert!(store.insert_if_absent("c", &payload).await.unwrap().is_none());
        // Same payload in another collection is independent.
        assert!(store.insert_if_absent("d", &payload).await.unwrap().is_some());
        assert!(store.contains_payload("c", &payload).await.unwrap());
        assert_eq!(store.len("c"), 1);
    }

    #[tokio::test]
    async fn find_and_delete_by_id() {
        let store = MemoryDocumentStore::new();
        let doc = store
            .insert_if_absent("c", &json!({"x": 1}))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(store.find_by_id("c", doc.id).await.unwrap(), Some(doc.clone()));
        assert!(store.find_by_id("other", doc.id).await.unwrap().is_none());
        assert!(store.delete_by_id("c", doc.id).await.unwrap());
        assert!(!store.delete_by_id("c", doc.id).await.unwrap());
        assert!(store.find_all("c").await.unwrap().is_empty());
    }
}
