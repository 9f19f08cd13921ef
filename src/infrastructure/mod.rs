// Copyright 2025 Cowboy AI, LLC.

//! Infrastructure layer for fact-domain
//!
//! This module contains the infrastructure concerns around the fact core:
//! - Event store contract and in-memory reference implementation
//! - Snapshot shape and snapshot repository contract
//! - Aggregate rehydration and snapshot generation services

pub mod event_store;
pub mod memory_event_store;
pub mod replay;
pub mod snapshot;

pub use event_store::{EventStore, EventStoreError};
pub use memory_event_store::InMemoryEventStore;
pub use replay::{AggregateRehydrator, ReplayError, SnapshotProcess, DEFAULT_REPLAY_WINDOW};
pub use snapshot::{InMemorySnapshotRepository, Snapshot, SnapshotError, SnapshotRepository};
