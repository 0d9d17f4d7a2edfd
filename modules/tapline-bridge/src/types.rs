use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One record read off a topic, with enough position to commit or rewind it.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicMessage {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    pub payload: serde_json::Value,
}

impl TopicMessage {
    /// Null and `{}` carry nothing worth storing.
    pub fn is_blank(&self) -> bool {
        match &self.payload {
            serde_json::Value::Null => true,
            serde_json::Value::Object(map) => map.is_empty(),
            _ => false,
        }
    }
}

/// A persisted copy of a drained record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Document {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub collection: String,
    pub payload: serde_json::Value,
    pub stored_at: DateTime<Utc>,
}

impl Document {
    pub fn new(collection: &str, payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            collection: collection.to_string(),
            payload,
            stored_at: Utc::now(),
        }
    }
}

/// What one drain pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DrainReport {
    pub consumed: usize,
    pub inserted: usize,
    pub duplicates: usize,
    pub skipped: usize,
}
