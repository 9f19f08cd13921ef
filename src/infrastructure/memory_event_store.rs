//! In-memory event store for tests and single-process deployments

use crate::events::{DomainEvent, EventStream};
use crate::identifiers::Identifier;
use crate::infrastructure::event_store::{EventStore, EventStoreError};
use crate::publisher::DomainEventPublisher;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Append-only in-memory event store
///
/// Keeps one ordered event list per subject and notifies the attached
/// publisher after each successful append. Not durable; the reference
/// implementation of the store contract.
#[derive(Debug)]
pub struct InMemoryEventStore<E> {
    streams: RwLock<HashMap<String, Vec<E>>>,
    publisher: Arc<DomainEventPublisher<E>>,
}

impl<E> InMemoryEventStore<E> {
    /// Create an empty store notifying the given publisher
    pub fn new(publisher: Arc<DomainEventPublisher<E>>) -> Self {
        Self {
            streams: RwLock::new(HashMap::new()),
            publisher,
        }
    }

    /// The publisher notified after each append
    pub fn publisher(&self) -> &Arc<DomainEventPublisher<E>> {
        &self.publisher
    }
}

#[async_trait]
impl<E: DomainEvent + 'static> EventStore for InMemoryEventStore<E> {
    type Event = E;

    async fn append(&self, event: E) -> Result<(), EventStoreError> {
        let subject = event.subject_id().ok_or_else(|| {
            EventStoreError::InvalidEventData(
                "event carries no subject identifier".to_string(),
            )
        })?;
        if subject.value().is_empty() || event.event_id().value().is_empty() {
            return Err(EventStoreError::InvalidEventData(
                "event identifiers must not be empty".to_string(),
            ));
        }
        let key = subject.value().to_string();

        let stream_len = {
            let mut streams = self.streams.write().await;
            let stream = streams.entry(key).or_default();
            stream.push(event.clone());
            stream.len()
        };
        debug!(
            event_type = event.event_type(),
            subject = subject.value(),
            stream_len,
            "event appended"
        );

        // append-then-notify: the fact is durable before anyone reacts to it
        self.publisher.publish(&event);
        Ok(())
    }

    async fn find_event_from(
        &self,
        event_id: &Identifier,
    ) -> Result<Option<E>, EventStoreError> {
        let streams = self.streams.read().await;
        Ok(streams
            .values()
            .flatten()
            .find(|event| event.event_id() == event_id)
            .cloned())
    }

    async fn load_event_stream(
        &self,
        subject_id: &Identifier,
    ) -> Result<Option<EventStream<E>>, EventStoreError> {
        let streams = self.streams.read().await;
        Ok(streams
            .get(subject_id.value())
            .map(|events| EventStream::new(events.len() as u64, events.clone())))
    }

    async fn load_event_stream_window(
        &self,
        subject_id: &Identifier,
        skip: usize,
        max_count: usize,
    ) -> Result<Option<EventStream<E>>, EventStoreError> {
        let streams = self.streams.read().await;
        Ok(streams.get(subject_id.value()).map(|events| {
            let window: Vec<E> = events.iter().skip(skip).take(max_count).cloned().collect();
            EventStream::new(events.len() as u64, window)
        }))
    }
}
