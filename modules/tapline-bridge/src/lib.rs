//! The write buffer and the read path.
//!
//! Handlers publish normalized records to a [`TopicBus`]. Read endpoints call
//! [`read_through`], which drains the topic into a [`DocumentStore`] collection
//! (skipping payloads already stored) and returns the collection.

pub mod drain;
pub mod kafka;
pub mod memory;
pub mod postgres;
pub mod store;
#[cfg(feature = "test-utils")]
pub mod testutil;
pub mod topic;
pub mod types;

pub use drain::{drain, read_through};
pub use kafka::KafkaBus;
pub use memory::{MemoryBus, MemoryDocumentStore};
pub use postgres::PgDocumentStore;
pub use store::DocumentStore;
pub use topic::{publish_records, TopicBus, TopicLocks};
pub use types::{Document, DrainReport, TopicMessage};
