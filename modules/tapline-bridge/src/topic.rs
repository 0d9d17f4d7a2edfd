use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;

use crate::types::TopicMessage;

/// A named-topic message channel.
///
/// `poll` hands out the next message for this service's consumer group.
/// A message is acknowledged with `commit`; `release` returns it so the next
/// `poll` on that topic redelivers it.
#[async_trait]
pub trait TopicBus: Send + Sync {
    async fn publish(&self, topic: &str, payload: &serde_json::Value) -> Result<()>;

    async fn poll(&self, topic: &str) -> Result<Option<TopicMessage>>;

    async fn commit(&self, message: &TopicMessage) -> Result<()>;

    async fn release(&self, message: &TopicMessage) -> Result<()>;

    /// Held by a reader from its first `poll` to its last `commit` or
    /// `release` on `topic`. The read position is shared per topic, so
    /// readers of one topic must not interleave.
    fn read_lock(&self, topic: &str) -> Arc<tokio::sync::Mutex<()>>;

    fn name(&self) -> &str;
}

/// One async lock per topic, created on first use.
#[derive(Default)]
pub struct TopicLocks {
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl TopicLocks {
    pub fn get(&self, topic: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.entry(topic.to_string()).or_default().clone()
    }
}

/// Serialize `records` and publish them as one message.
pub async fn publish_records<T>(bus: &dyn TopicBus, topic: &str, records: &T) -> Result<()>
where
    T: Serialize + ?Sized + Sync,
{
    let payload = serde_json::to_value(records)
        .with_context(|| format!("Failed to serialize records for {topic}"))?;
    bus.publish(topic, &payload).await?;
    tracing::debug!(topic, bus = bus.name(), "Published records");
    Ok(())
}
