//! Channel-backed mutation sink.
//!
//! `record` only pushes onto an unbounded channel; a separate task drains
//! the channel into a [`CatalogStore`] with [`apply_mutations`]. Delivery is
//! at-least-once: failed increments are retried a bounded number of times.

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures::StreamExt;
use tracing::{debug, warn};

use super::traits::{CatalogStore, MutationEvent, MutationSink};

/// Attempts per event before it is dropped
const MAX_APPLY_ATTEMPTS: usize = 3;

#[derive(Debug, Clone)]
pub struct ChannelMutationSink {
    sender: UnboundedSender<MutationEvent>,
}

impl ChannelMutationSink {
    /// Create a sink and the receiving end to drain
    pub fn channel() -> (Self, UnboundedReceiver<MutationEvent>) {
        let (sender, receiver) = mpsc::unbounded();
        (Self { sender }, receiver)
    }
}

impl MutationSink for ChannelMutationSink {
    fn record(&self, event: MutationEvent) {
        if let Err(e) = self.sender.unbounded_send(event) {
            let event = e.into_inner();
            warn!(id = event.id(), "mutation channel closed, event dropped");
        }
    }
}

/// Drain `events` into `store` until every sender is dropped.
///
/// Returns the number of events applied successfully.
pub async fn apply_mutations(
    mut events: UnboundedReceiver<MutationEvent>,
    store: &dyn CatalogStore,
) -> usize {
    let mut applied = 0;

    while let Some(event) = events.next().await {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let outcome = match &event {
                MutationEvent::EntityMention { id, at } => store.increment_entity_mention(id, *at).await,
                MutationEvent::TermUsage { id, at } => store.increment_term_usage(id, *at).await,
            };

            match outcome {
                Ok(()) => {
                    applied += 1;
                    break;
                }
                Err(e) if attempt < MAX_APPLY_ATTEMPTS => {
                    debug!(id = event.id(), attempt, error = %e, "retrying mutation");
                }
                Err(e) => {
                    warn!(id = event.id(), error = %e, "giving up on mutation");
                    break;
                }
            }
        }
    }

    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Entity, EntityType, InMemoryCatalog, Term};
    use chrono::Utc;
    use futures::executor::block_on;

    #[test]
    fn test_channel_sink_applies_to_store() {
        let catalog = InMemoryCatalog::new(
            vec![Entity::new("neom", "نيوم", EntityType::Project, 9.0)],
            vec![Term::new("t1", "الذكاء الاصطناعي", "محاكاة الذكاء البشري")],
            vec![],
        );
        let (sink, receiver) = ChannelMutationSink::channel();

        sink.record(MutationEvent::EntityMention { id: "neom".into(), at: Utc::now() });
        sink.record(MutationEvent::EntityMention { id: "neom".into(), at: Utc::now() });
        sink.record(MutationEvent::TermUsage { id: "t1".into(), at: Utc::now() });
        drop(sink);

        let applied = block_on(apply_mutations(receiver, &catalog));
        assert_eq!(applied, 3);
        assert_eq!(catalog.entity("neom").unwrap().mention_count(), 2);
        assert_eq!(catalog.term("t1").unwrap().usage_count(), 1);
    }

    #[test]
    fn test_unknown_ids_are_not_counted() {
        let catalog = InMemoryCatalog::default();
        let (sink, receiver) = ChannelMutationSink::channel();

        sink.record(MutationEvent::TermUsage { id: "missing".into(), at: Utc::now() });
        drop(sink);

        assert_eq!(block_on(apply_mutations(receiver, &catalog)), 0);
    }

    #[test]
    fn test_record_after_receiver_dropped_does_not_panic() {
        let (sink, receiver) = ChannelMutationSink::channel();
        drop(receiver);
        sink.record(MutationEvent::TermUsage { id: "t1".into(), at: Utc::now() });
    }
}
