use anyhow::Result;
use tapline_common::TopicRoute;

use crate::store::DocumentStore;
use crate::topic::TopicBus;
use crate::types::{Document, DrainReport};

/// Move pending messages from `route.topic` into `route.collection`.
///
/// Stops when the topic has nothing more within the bus poll timeout, or after
/// `limit` messages. A message is committed only once its payload is stored
/// (or found to be stored already). Blank payloads are committed and dropped.
/// If the store fails, the message is released for redelivery and the error
/// is returned. Drains of one topic run one at a time.
pub async fn drain(
    bus: &dyn TopicBus,
    store: &dyn DocumentStore,
    route: TopicRoute,
    limit: usize,
) -> Result<DrainReport> {
    let lock = bus.read_lock(route.topic);
    let _reading = lock.lock().await;
    let mut report = DrainReport::default();

    while report.consumed < limit.max(1) {
        let Some(message) = bus.poll(route.topic).await? else {
            break;
        };
        report.consumed += 1;

        if message.is_blank() {
            bus.commit(&message).await?;
            report.skipped += 1;
            continue;
        }

        match store
            .insert_if_absent(route.collection, &message.payload)
            .await
        {
            Ok(Some(_)) => report.inserted += 1,
            Ok(None) => report.duplicates += 1,
            Err(e) => {
                tracing::warn!(
                    topic = route.topic,
                    collection = route.collection,
                    offset = message.offset,
                    error = %e,
                    "Store write failed, releasing message"
                );
                if let Err(release_err) = bus.release(&message).await {
                    tracing::warn!(topic = route.topic, error = %release_err, "Release failed");
                }
                return Err(e);
            }
        }
        bus.commit(&message).await?;
    }

    if report.consumed > 0 {
        tracing::info!(
            topic = route.topic,
            collection = route.collection,
            consumed = report.consumed,
            inserted = report.inserted,
            duplicates = report.duplicates,
            skipped = report.skipped,
            "Drained topic"
        );
    }
    Ok(report)
}

/// Drain, then return the whole collection oldest first.
pub async fn read_through(
    bus: &dyn TopicBus,
    store: &dyn DocumentStore,
    route: TopicRoute,
    limit: usize,
) -> Result<Vec<Document>> {
    drain(bus, store, route, limit).await?;
    store.find_all(route.collection).await
}
