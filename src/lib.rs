//! # Fact Domain
//!
//! Core Domain-Driven Design (DDD) components for modeling domain state as
//! immutable historical facts.
//!
//! This crate provides the fundamental building blocks:
//! - **Identifier**: location-independent identity as (name, value) pairs
//! - **Entity**: immutable historical facts holding identifying information
//! - **MutableProperty**: versioned attribute bundles whose changes chain
//!   superseded versions instead of overwriting them
//! - **EntityReference**: versioned relations between entities
//! - **Domain Events**: facts that happened, the basis of event sourcing
//! - **Aggregates**: event-sourced roots rebuilt by replaying their history
//! - **Snapshots & Rehydration**: full-state captures with commit cursors
//!   and windowed stream replay
//! - **Commands & Queries**: write requests answered by acknowledgments,
//!   read requests served from event-fed read models
//!
//! ## Design Principles
//!
//! 1. **Facts, not state**: a change produces a new immutable version; the
//!    superseded version becomes its predecessor
//! 2. **Functional equality**: equivalent values compare equal regardless of
//!    how their histories were reached
//! 3. **Single mutation entry point**: live operations and replay flow
//!    through the same event application
//! 4. **Injected collaborators**: publishers and stores are passed in, never
//!    process-global
//! 5. **Event-Driven**: commands produce event streams, not direct results

#![warn(missing_docs)]

mod aggregate;
mod cqrs;
mod entity;
mod errors;
mod events;
mod history;
mod identifiers;
mod process;
mod property;
mod publisher;
mod reference;
mod states;

pub mod infrastructure;

// Re-export core types
pub use aggregate::{Aggregate, HydrationCapability, MutedAggregateFactory};
pub use cqrs::{
    Command, CommandAcknowledgment, CommandHandler, CommandStatus, Query, QueryAcknowledgment,
    QueryHandler, QueryResponse, QueryStatus,
};
pub use entity::Entity;
pub use errors::{DomainError, DomainResult};
pub use events::{DomainEvent, EventStream};
pub use history::{HistoryState, VersionChain, VersionId, VersionRecord};
pub use identifiers::{Identifier, DEFAULT_IDENTIFIER_NAME};
pub use process::{Process, ProcessDescriptor, ProcessEvent, ProcessFactory};
pub use property::{AttributeMap, AttributeValue, MutableProperty, PropertyKind};
pub use publisher::{DomainEventPublisher, DomainEventSubscriber};
pub use reference::EntityReference;
pub use states::{ActivityState, CompletionState};
