// Copyright 2025 Cowboy AI, LLC.

//! Domain events and ordered event streams
//!
//! Events are immutable facts that have occurred in the domain. They form
//! the basis of event sourcing: an aggregate's state is whatever its
//! recorded events say happened.

use crate::identifiers::Identifier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Base trait for all domain events
///
/// # Examples
///
/// ```rust
/// use chrono::{DateTime, Utc};
/// use fact_domain::{DomainEvent, Identifier};
///
/// #[derive(Debug, Clone)]
/// struct TenantRegistered {
///     event_id: Identifier,
///     tenant_id: Identifier,
///     occurred_at: DateTime<Utc>,
/// }
///
/// impl DomainEvent for TenantRegistered {
///     fn event_id(&self) -> &Identifier {
///         &self.event_id
///     }
///
///     fn subject_id(&self) -> Option<&Identifier> {
///         Some(&self.tenant_id)
///     }
///
///     fn event_type(&self) -> &'static str {
///         "TenantRegistered"
///     }
///
///     fn occurred_at(&self) -> DateTime<Utc> {
///         self.occurred_at
///     }
/// }
///
/// let event = TenantRegistered {
///     event_id: Identifier::generate(None),
///     tenant_id: Identifier::new("uid", "tenant-1").unwrap(),
///     occurred_at: Utc::now(),
/// };
///
/// assert_eq!(event.event_type(), "TenantRegistered");
/// ```
pub trait DomainEvent: Clone + Send + Sync + std::fmt::Debug {
    /// Unique identifier of this event occurrence
    fn event_id(&self) -> &Identifier;

    /// Identifier of the subject domain object this event is about
    fn subject_id(&self) -> Option<&Identifier>;

    /// Get the event type name
    fn event_type(&self) -> &'static str;

    /// When the fact occurred
    fn occurred_at(&self) -> DateTime<Utc>;
}

/// An ordered slice of a subject's event history
///
/// The stream version is the subject's stored event count at read time, so
/// a consumer can detect how far behind a partial stream is. Cloning a
/// stream deep-copies its events; streams never share mutable state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventStream<E> {
    version: u64,
    events: Vec<E>,
}

impl<E> EventStream<E> {
    /// Assemble a stream from already-ordered events
    pub fn new(version: u64, events: Vec<E>) -> Self {
        Self { version, events }
    }

    /// The subject's stored event count when this stream was read
    pub fn version(&self) -> u64 {
        self.version
    }

    /// The events in occurrence order
    pub fn events(&self) -> &[E] {
        &self.events
    }

    /// Consume the stream, yielding its events in occurrence order
    pub fn into_events(self) -> Vec<E> {
        self.events
    }

    /// Number of events carried by this stream
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether this stream carries no events
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
