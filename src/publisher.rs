// Copyright 2025 Cowboy AI, LLC.

//! In-process domain event publication
//!
//! The publisher is an injected collaborator, never process-global state.
//! Components that need to announce facts hold a shared handle; components
//! that need to observe facts register a subscriber on that handle.

use crate::errors::DomainResult;
use crate::events::DomainEvent;
use std::fmt;
use std::sync::{Arc, RwLock};
use tracing::warn;

/// Observer of published domain events
pub trait DomainEventSubscriber<E>: Send + Sync {
    /// React to one published event
    ///
    /// A failure here is the subscriber's own problem: publication already
    /// happened and other subscribers still get the event.
    fn handle_event(&self, event: &E) -> DomainResult<()>;

    /// Event type this subscriber is interested in
    ///
    /// `None` subscribes to every event type.
    fn subscribed_to_event_type(&self) -> Option<&'static str> {
        None
    }
}

/// Fan-out point delivering published events to registered subscribers
///
/// Each publisher instance owns its own subscriber list. Publication works
/// on a point-in-time copy of that list, so subscribing, removing, or
/// resetting while a publication is in flight never affects the deliveries
/// already underway.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use chrono::{DateTime, Utc};
/// use fact_domain::{DomainEvent, DomainEventPublisher, DomainEventSubscriber, DomainResult, Identifier};
///
/// #[derive(Debug, Clone)]
/// struct Registered {
///     event_id: Identifier,
///     occurred_at: DateTime<Utc>,
/// }
///
/// impl DomainEvent for Registered {
///     fn event_id(&self) -> &Identifier { &self.event_id }
///     fn subject_id(&self) -> Option<&Identifier> { None }
///     fn event_type(&self) -> &'static str { "Registered" }
///     fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
/// }
///
/// #[derive(Default)]
/// struct Counter(AtomicUsize);
///
/// impl DomainEventSubscriber<Registered> for Counter {
///     fn handle_event(&self, _event: &Registered) -> DomainResult<()> {
///         self.0.fetch_add(1, Ordering::SeqCst);
///         Ok(())
///     }
/// }
///
/// let publisher = DomainEventPublisher::new();
/// let counter = Arc::new(Counter::default());
/// publisher.subscribe(counter.clone());
///
/// publisher.publish(&Registered {
///     event_id: Identifier::generate(None),
///     occurred_at: Utc::now(),
/// });
/// assert_eq!(counter.0.load(Ordering::SeqCst), 1);
/// ```
pub struct DomainEventPublisher<E> {
    subscribers: RwLock<Vec<Arc<dyn DomainEventSubscriber<E>>>>,
}

impl<E> DomainEventPublisher<E> {
    /// Create a publisher with no subscribers
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
        }
    }

    /// Register a subscriber
    ///
    /// Registering the same subscriber handle twice keeps a single entry.
    pub fn subscribe(&self, subscriber: Arc<dyn DomainEventSubscriber<E>>) {
        let mut subscribers = match self.subscribers.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if !subscribers.iter().any(|s| Arc::ptr_eq(s, &subscriber)) {
            subscribers.push(subscriber);
        }
    }

    /// Remove a previously registered subscriber
    ///
    /// Returns whether the handle was registered.
    pub fn remove(&self, subscriber: &Arc<dyn DomainEventSubscriber<E>>) -> bool {
        let mut subscribers = match self.subscribers.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let before = subscribers.len();
        subscribers.retain(|s| !Arc::ptr_eq(s, subscriber));
        subscribers.len() < before
    }

    /// Drop every registered subscriber
    ///
    /// Publications already in flight keep their subscriber snapshot and
    /// complete their deliveries.
    pub fn reset(&self) {
        let mut subscribers = match self.subscribers.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        subscribers.clear();
    }

    /// Number of currently registered subscribers
    pub fn subscriber_count(&self) -> usize {
        match self.subscribers.read() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    fn snapshot(&self) -> Vec<Arc<dyn DomainEventSubscriber<E>>> {
        match self.subscribers.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl<E: DomainEvent> DomainEventPublisher<E> {
    /// Deliver one event to every interested subscriber
    ///
    /// Subscribers with a type filter only see matching events. A failing
    /// subscriber is logged and skipped; it never blocks delivery to the
    /// others, and never undoes the fact that was published.
    pub fn publish(&self, event: &E) {
        for subscriber in self.snapshot() {
            let interested = match subscriber.subscribed_to_event_type() {
                Some(event_type) => event_type == event.event_type(),
                None => true,
            };
            if !interested {
                continue;
            }
            if let Err(error) = subscriber.handle_event(event) {
                warn!(
                    event_type = event.event_type(),
                    event_id = %event.event_id(),
                    %error,
                    "subscriber failed to handle published event"
                );
            }
        }
    }
}

impl<E> Default for DomainEventPublisher<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for DomainEventPublisher<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomainEventPublisher")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifiers::Identifier;
    use chrono::{DateTime, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone)]
    struct TestEvent {
        event_id: Identifier,
        kind: &'static str,
        occurred_at: DateTime<Utc>,
    }

    impl TestEvent {
        fn of(kind: &'static str) -> Self {
            Self {
                event_id: Identifier::generate(None),
                kind,
                occurred_at: Utc::now(),
            }
        }
    }

    impl DomainEvent for TestEvent {
        fn event_id(&self) -> &Identifier {
            &self.event_id
        }

        fn subject_id(&self) -> Option<&Identifier> {
            None
        }

        fn event_type(&self) -> &'static str {
            self.kind
        }

        fn occurred_at(&self) -> DateTime<Utc> {
            self.occurred_at
        }
    }

    #[derive(Default)]
    struct Recorder {
        seen: AtomicUsize,
        filter: Option<&'static str>,
        fail: bool,
    }

    impl DomainEventSubscriber<TestEvent> for Recorder {
        fn handle_event(&self, _event: &TestEvent) -> DomainResult<()> {
            self.seen.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(crate::errors::DomainError::generic("subscriber exploded"));
            }
            Ok(())
        }

        fn subscribed_to_event_type(&self) -> Option<&'static str> {
            self.filter
        }
    }

    /// Test every wildcard subscriber receives every published event
    #[test]
    fn test_fan_out_to_all_subscribers() {
        let publisher = DomainEventPublisher::new();
        let first = Arc::new(Recorder::default());
        let second = Arc::new(Recorder::default());
        publisher.subscribe(first.clone());
        publisher.subscribe(second.clone());

        publisher.publish(&TestEvent::of("Created"));
        publisher.publish(&TestEvent::of("Renamed"));

        assert_eq!(first.seen.load(Ordering::SeqCst), 2);
        assert_eq!(second.seen.load(Ordering::SeqCst), 2);
    }

    /// Test a type filter restricts delivery to matching events
    #[test]
    fn test_type_filter() {
        let publisher = DomainEventPublisher::new();
        let filtered = Arc::new(Recorder {
            filter: Some("Created"),
            ..Recorder::default()
        });
        let wildcard = Arc::new(Recorder::default());
        publisher.subscribe(filtered.clone());
        publisher.subscribe(wildcard.clone());

        publisher.publish(&TestEvent::of("Created"));
        publisher.publish(&TestEvent::of("Renamed"));
        publisher.publish(&TestEvent::of("Renamed"));

        assert_eq!(filtered.seen.load(Ordering::SeqCst), 1);
        assert_eq!(wildcard.seen.load(Ordering::SeqCst), 3);
    }

    /// Test a failing subscriber never blocks the others
    #[test]
    fn test_failing_subscriber_is_skipped() {
        let publisher = DomainEventPublisher::new();
        let failing = Arc::new(Recorder {
            fail: true,
            ..Recorder::default()
        });
        let healthy = Arc::new(Recorder::default());
        publisher.subscribe(failing.clone());
        publisher.subscribe(healthy.clone());

        publisher.publish(&TestEvent::of("Created"));

        assert_eq!(failing.seen.load(Ordering::SeqCst), 1);
        assert_eq!(healthy.seen.load(Ordering::SeqCst), 1);
    }

    /// Test duplicate registration keeps one entry and removal works
    #[test]
    fn test_subscribe_and_remove() {
        let publisher = DomainEventPublisher::new();
        let recorder: Arc<dyn DomainEventSubscriber<TestEvent>> =
            Arc::new(Recorder::default());

        publisher.subscribe(recorder.clone());
        publisher.subscribe(recorder.clone());
        assert_eq!(publisher.subscriber_count(), 1);

        assert!(publisher.remove(&recorder));
        assert!(!publisher.remove(&recorder));
        assert_eq!(publisher.subscriber_count(), 0);
    }

    struct Resetting {
        publisher: Arc<DomainEventPublisher<TestEvent>>,
        seen: AtomicUsize,
    }

    impl DomainEventSubscriber<TestEvent> for Resetting {
        fn handle_event(&self, _event: &TestEvent) -> DomainResult<()> {
            self.publisher.reset();
            self.seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Test a reset during publication does not cut off in-flight delivery
    #[test]
    fn test_reset_keeps_in_flight_deliveries() {
        let publisher = Arc::new(DomainEventPublisher::new());
        let resetting = Arc::new(Resetting {
            publisher: publisher.clone(),
            seen: AtomicUsize::new(0),
        });
        let late = Arc::new(Recorder::default());
        publisher.subscribe(resetting.clone());
        publisher.subscribe(late.clone());

        publisher.publish(&TestEvent::of("Created"));

        // both subscribers of the snapshot were served, then the list was empty
        assert_eq!(resetting.seen.load(Ordering::SeqCst), 1);
        assert_eq!(late.seen.load(Ordering::SeqCst), 1);
        assert_eq!(publisher.subscriber_count(), 0);

        publisher.publish(&TestEvent::of("Renamed"));
        assert_eq!(late.seen.load(Ordering::SeqCst), 1);
    }
}
