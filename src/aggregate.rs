// Copyright 2025 Cowboy AI, LLC.

//! Aggregate contracts for event-sourced domain objects
//!
//! An aggregate never loads state from storage directly. Its state is
//! rebuilt by replaying the events that were recorded about it, in order,
//! through the same mutation entry point that live changes use.

use crate::errors::DomainResult;
use crate::events::{DomainEvent, EventStream};
use crate::identifiers::Identifier;

/// Ability to rebuild state from recorded events
///
/// `mutate_when` is the single mutation entry point: every variant of the
/// aggregate's event type must be handled, so that replaying a stored
/// stream reproduces exactly the state the live operations produced.
pub trait HydrationCapability {
    /// The event type this object can be rehydrated from
    type Event: DomainEvent;

    /// Apply one historical event to the current state
    fn mutate_when(&mut self, event: &Self::Event) -> DomainResult<()>;

    /// Apply a stream of historical events in occurrence order
    ///
    /// Stops at the first event that fails to apply, leaving the state as
    /// of the last successful event.
    fn replay_events(&mut self, stream: &EventStream<Self::Event>) -> DomainResult<()> {
        for event in stream.events() {
            self.mutate_when(event)?;
        }
        Ok(())
    }
}

/// An event-sourced domain object with its own identity and commit cursor
pub trait Aggregate: HydrationCapability {
    /// The aggregate's combined identifier
    fn identified(&self) -> DomainResult<Identifier>;

    /// Identifier of the last change event applied to this state
    ///
    /// `None` until a first change has been applied. Snapshots record this
    /// cursor so a restored state knows where its event history resumes.
    fn commit_version(&self) -> Option<&Identifier>;
}

/// Factory rebuilding a muted aggregate instance from its recorded history
///
/// "Muted" because the rebuilt instance replays facts without announcing
/// them again: rehydration must never re-publish history.
pub trait MutedAggregateFactory {
    /// The aggregate type this factory rebuilds
    type Aggregate: Aggregate;

    /// Rebuild an instance of the identified aggregate from its events
    ///
    /// The event slice must start at the aggregate's origin; a history that
    /// does not begin with a creation fact cannot produce an instance.
    fn instance_of(
        &self,
        id: &Identifier,
        events: &[<Self::Aggregate as HydrationCapability>::Event],
    ) -> DomainResult<Self::Aggregate>;
}
