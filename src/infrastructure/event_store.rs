//! Event store trait and related types

use crate::events::{DomainEvent, EventStream};
use crate::identifiers::Identifier;
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when working with the event store
#[derive(Debug, Error)]
pub enum EventStoreError {
    /// Failed to connect to the event store
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Failed to serialize or deserialize event data
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Event data is malformed or invalid
    #[error("Invalid event data: {0}")]
    InvalidEventData(String),

    /// General storage operation failed
    #[error("Storage error: {0}")]
    StorageError(String),
}

/// Append-only store of the facts recorded about domain subjects
///
/// Events are keyed to the subject identified by their `subject_id`. Each
/// subject's events form an ordered stream; the stream version is the
/// subject's stored event count at read time.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// The event type this store persists
    type Event: DomainEvent;

    /// Append one event to its subject's stream
    ///
    /// Fails with invalid event data when the event carries no subject
    /// identifier or an identifier with an empty value. After a durable
    /// append the store notifies the attached publisher's subscribers; a
    /// notification failure never rolls the append back.
    async fn append(&self, event: Self::Event) -> Result<(), EventStoreError>;

    /// Look up one event by its own identifier
    async fn find_event_from(
        &self,
        event_id: &Identifier,
    ) -> Result<Option<Self::Event>, EventStoreError>;

    /// Load the full ordered stream of a subject
    ///
    /// `None` for a subject no event was ever recorded about.
    async fn load_event_stream(
        &self,
        subject_id: &Identifier,
    ) -> Result<Option<EventStream<Self::Event>>, EventStoreError>;

    /// Load a window of a subject's stream
    ///
    /// Skips `skip` events then yields at most `max_count`, preserving
    /// order. The returned stream version is still the subject's full
    /// stored event count. `None` for an unknown subject; a window past
    /// the end of a known stream is empty, not absent.
    async fn load_event_stream_window(
        &self,
        subject_id: &Identifier,
        skip: usize,
        max_count: usize,
    ) -> Result<Option<EventStream<Self::Event>>, EventStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test error display formats carry their detail
    #[test]
    fn test_error_display() {
        let err = EventStoreError::InvalidEventData("event carries no subject".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid event data: event carries no subject"
        );

        let err = EventStoreError::StorageError("disk full".to_string());
        assert_eq!(err.to_string(), "Storage error: disk full");
    }
}
