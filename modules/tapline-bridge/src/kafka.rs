//! Kafka-backed [`TopicBus`].
//!
//! One producer for every topic and one consumer per topic. Consumers are
//! assigned their partitions directly and never join the group, so no
//! rebalance ever moves a topic away from its reader. The group id only
//! names where offsets are committed.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::{Message, Offset, TopicPartitionList};
use tapline_common::TopicRoute;
use uuid::Uuid;

use crate::topic::{TopicBus, TopicLocks};
use crate::types::TopicMessage;

const SEND_TIMEOUT: Duration = Duration::from_secs(5);
const SEEK_TIMEOUT: Duration = Duration::from_secs(1);
const METADATA_TIMEOUT: Duration = Duration::from_secs(5);

pub struct KafkaBus {
    bootstrap_servers: String,
    group_id: String,
    poll_timeout: Duration,
    producer: FutureProducer,
    consumers: Mutex<HashMap<String, Arc<StreamConsumer>>>,
    locks: TopicLocks,
}

impl KafkaBus {
    /// Connect and assign a consumer to every route's topic that already
    /// exists. Topics created later are assigned on first read.
    pub fn new(
        bootstrap_servers: &str,
        group_id: &str,
        poll_timeout: Duration,
        routes: &[TopicRoute],
    ) -> Result<Self> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", bootstrap_servers)
            .set("message.timeout.ms", "5000")
            .create()
            .context("Failed to create Kafka producer")?;

        let bus = Self {
            bootstrap_servers: bootstrap_servers.to_string(),
            group_id: group_id.to_string(),
            poll_timeout,
            producer,
            consumers: Mutex::new(HashMap::new()),
            locks: TopicLocks::default(),
        };

        let mut assigned = 0;
        for route in routes {
            if bus.consumer(route.topic)?.is_some() {
                assigned += 1;
            }
        }
        tracing::info!(
            bootstrap_servers,
            group_id,
            assigned,
            topics = routes.len(),
            "Kafka bus ready"
        );
        Ok(bus)
    }

    /// The consumer for `topic`, or `None` while the topic has no partitions.
    fn consumer(&self, topic: &str) -> Result<Option<Arc<StreamConsumer>>> {
        let mut consumers = self.consumers.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(consumer) = consumers.get(topic) {
            return Ok(Some(consumer.clone()));
        }

        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &self.bootstrap_servers)
            .set("group.id", &self.group_id)
            .set("enable.auto.commit", "false")
            .set("enable.partition.eof", "false")
            .create()
            .with_context(|| format!("Failed to create Kafka consumer for {topic}"))?;

        let Some(start) = start_positions(&consumer, topic)? else {
            tracing::debug!(topic, "Topic has no partitions yet");
            return Ok(None);
        };
        consumer
            .assign(&start)
            .with_context(|| format!("Failed to assign {topic}"))?;
        tracing::debug!(topic, partitions = start.count(), "Assigned consumer");

        let consumer = Arc::new(consumer);
        consumers.insert(topic.to_string(), consumer.clone());
        Ok(Some(consumer))
    }

    fn assigned(&self, topic: &str) -> Result<Arc<StreamConsumer>> {
        self.consumer(topic)?
            .with_context(|| format!("No consumer assigned to {topic}"))
    }
}

/// Every partition of `topic` at the group's committed offset, or at the
/// beginning where nothing is committed yet.
fn start_positions(consumer: &StreamConsumer, topic: &str) -> Result<Option<TopicPartitionList>> {
    let metadata = consumer
        .fetch_metadata(Some(topic), METADATA_TIMEOUT)
        .with_context(|| format!("Failed to fetch metadata for {topic}"))?;
    let partitions: Vec<i32> = metadata
        .topics()
        .iter()
        .filter(|t| t.name() == topic && t.error().is_none())
        .flat_map(|t| t.partitions().iter().map(|p| p.id()))
        .collect();
    if partitions.is_empty() {
        return Ok(None);
    }

    let mut wanted = TopicPartitionList::new();
    for partition in &partitions {
        wanted.add_partition(topic, *partition);
    }
    let committed = consumer
        .committed_offsets(wanted, METADATA_TIMEOUT)
        .with_context(|| format!("Failed to read committed offsets for {topic}"))?;

    let mut start = TopicPartitionList::new();
    for elem in committed.elements() {
        start.add_partition_offset(topic, elem.partition(), resume_from(elem.offset()))?;
    }
    Ok(Some(start))
}

fn resume_from(committed: Offset) -> Offset {
    match committed {
        Offset::Offset(offset) => Offset::Offset(offset),
        _ => Offset::Beginning,
    }
}

fn decode_payload(topic: &str, bytes: Option<&[u8]>) -> serde_json::Value {
    let Some(bytes) = bytes else {
        return serde_json::Value::Null;
    };
    match serde_json::from_slice(bytes) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(topic, error = %e, "Non-JSON payload, keeping raw text");
            serde_json::Value::String(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

#[async_trait]
impl TopicBus for KafkaBus {
    async fn publish(&self, topic: &str, payload: &serde_json::Value) -> Result<()> {
        let bytes = serde_json::to_vec(payload)?;
        let key = Uuid::new_v4().to_string();
        let record = FutureRecord::to(topic).payload(&bytes).key(key.as_str());

        self.producer
            .send(record, SEND_TIMEOUT)
            .await
            .map_err(|(e, _)| anyhow::anyhow!("Kafka send to {topic} failed: {e}"))?;
        Ok(())
    }

    async fn poll(&self, topic: &str) -> Result<Option<TopicMessage>> {
        let Some(consumer) = self.consumer(topic)? else {
            return Ok(None);
        };
        let received = tokio::time::timeout(self.poll_timeout, consumer.recv()).await;

        let message = match received {
            Err(_elapsed) => return Ok(None),
            Ok(Err(e)) => return Err(anyhow::anyhow!("Kafka receive on {topic} failed: {e}")),
            Ok(Ok(msg)) => TopicMessage {
                topic: msg.topic().to_string(),
                partition: msg.partition(),
                offset: msg.offset(),
                payload: decode_payload(topic, msg.payload()),
            },
        };
        Ok(Some(message))
    }

    async fn commit(&self, message: &TopicMessage) -> Result<()> {
        let consumer = self.assigned(&message.topic)?;
        let mut tpl = TopicPartitionList::new();
        tpl.add_partition_offset(
            &message.topic,
            message.partition,
            Offset::Offset(message.offset + 1),
        )?;
        consumer
            .commit(&tpl, CommitMode::Sync)
            .with_context(|| format!("Failed to commit {}@{}", message.topic, message.offset))?;
        Ok(())
    }

    async fn release(&self, message: &TopicMessage) -> Result<()> {
        let consumer = self.assigned(&message.topic)?;
        consumer
            .seek(
                &message.topic,
                message.partition,
                Offset::Offset(message.offset),
                SEEK_TIMEOUT,
            )
            .with_context(|| format!("Failed to rewind {}@{}", message.topic, message.offset))?;
        Ok(())
    }

    fn read_lock(&self, topic: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.locks.get(topic)
    }

    fn name(&self) -> &str {
        "kafka"
    }
}
