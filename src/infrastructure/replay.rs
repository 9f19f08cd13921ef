//! Aggregate rehydration from event streams and snapshots

use crate::aggregate::{HydrationCapability, MutedAggregateFactory};
use crate::errors::DomainError;
use crate::events::DomainEvent;
use crate::identifiers::Identifier;
use crate::infrastructure::event_store::{EventStore, EventStoreError};
use crate::infrastructure::snapshot::{Snapshot, SnapshotError, SnapshotRepository};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Default number of events fetched per stream window during replay
pub const DEFAULT_REPLAY_WINDOW: usize = 100;

/// Errors that can occur during aggregate rehydration
#[derive(Debug, Error)]
pub enum ReplayError {
    /// Event store access failed
    #[error("Event store error: {0}")]
    Store(#[from] EventStoreError),

    /// Snapshot storage access failed
    #[error("Snapshot storage error: {0}")]
    Snapshot(#[from] SnapshotError),

    /// State restoration or event application failed
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// No event was ever recorded about the subject
    #[error("No event history found for subject {0}")]
    AggregateNotFound(String),

    /// The snapshot's replay cursor does not exist in the stored stream
    #[error("Commit version {commit_version} of subject {subject} was not found in its event stream")]
    UnknownCommitVersion {
        /// Identifier value of the subject being loaded
        subject: String,
        /// The missing replay cursor
        commit_version: String,
    },
}

/// Rebuilds aggregates from their stored history
///
/// Without a snapshot the full stream is replayed through the factory.
/// With one, the snapshot body is restored and the stream is paged in
/// windows: events are skipped until the snapshot's commit version is
/// seen, then every later event is applied strictly in stream order. A
/// load either yields the complete current state or fails; a partial
/// aggregate is never returned.
pub struct AggregateRehydrator<S, R, F> {
    event_store: Arc<S>,
    snapshots: Arc<R>,
    factory: F,
    window: usize,
}

impl<S, R, F> AggregateRehydrator<S, R, F>
where
    F: MutedAggregateFactory,
    F::Aggregate: DeserializeOwned,
    S: EventStore<Event = <F::Aggregate as HydrationCapability>::Event>,
    R: SnapshotRepository,
{
    /// Create a rehydrator with the default window size
    pub fn new(event_store: Arc<S>, snapshots: Arc<R>, factory: F) -> Self {
        Self::with_window(event_store, snapshots, factory, DEFAULT_REPLAY_WINDOW)
    }

    /// Create a rehydrator fetching `window` events per stream page
    pub fn with_window(
        event_store: Arc<S>,
        snapshots: Arc<R>,
        factory: F,
        window: usize,
    ) -> Self {
        Self {
            event_store,
            snapshots,
            factory,
            window: window.max(1),
        }
    }

    /// Rebuild the identified aggregate's current state
    pub async fn load(&self, subject_id: &Identifier) -> Result<F::Aggregate, ReplayError> {
        let uid = subject_id.value();
        match self.snapshots.get_latest_snapshot_by_id(uid).await? {
            None => self.load_from_origin(subject_id).await,
            Some(snapshot) => self.load_from_snapshot(subject_id, &snapshot).await,
        }
    }

    async fn load_from_origin(
        &self,
        subject_id: &Identifier,
    ) -> Result<F::Aggregate, ReplayError> {
        let stream = self
            .event_store
            .load_event_stream(subject_id)
            .await?
            .ok_or_else(|| ReplayError::AggregateNotFound(subject_id.value().to_string()))?;
        debug!(
            subject = subject_id.value(),
            events = stream.len(),
            "rehydrating from full stream"
        );
        Ok(self.factory.instance_of(subject_id, stream.events())?)
    }

    async fn load_from_snapshot(
        &self,
        subject_id: &Identifier,
        snapshot: &Snapshot,
    ) -> Result<F::Aggregate, ReplayError> {
        let uid = subject_id.value();
        let mut aggregate: F::Aggregate = snapshot.restore()?;
        let mut skip = 0;
        let mut cursor_found = false;
        let mut applied = 0;

        loop {
            let window = self
                .event_store
                .load_event_stream_window(subject_id, skip, self.window)
                .await?
                .ok_or_else(|| ReplayError::AggregateNotFound(uid.to_string()))?;
            if window.is_empty() {
                break;
            }
            let fetched = window.len();
            for event in window.events() {
                if cursor_found {
                    aggregate.mutate_when(event)?;
                    applied += 1;
                } else if event.event_id().value() == snapshot.commit_version() {
                    cursor_found = true;
                }
            }
            skip += fetched;
            if fetched < self.window {
                break;
            }
        }

        if !cursor_found {
            return Err(ReplayError::UnknownCommitVersion {
                subject: uid.to_string(),
                commit_version: snapshot.commit_version().to_string(),
            });
        }
        debug!(
            subject = uid,
            commit = snapshot.commit_version(),
            applied,
            "rehydrated from snapshot"
        );
        Ok(aggregate)
    }
}

/// Generates snapshots of event-sourced aggregates
pub struct SnapshotProcess<S, R, F> {
    event_store: Arc<S>,
    snapshots: Arc<R>,
    factory: F,
}

impl<S, R, F> SnapshotProcess<S, R, F>
where
    F: MutedAggregateFactory,
    F::Aggregate: Serialize,
    S: EventStore<Event = <F::Aggregate as HydrationCapability>::Event>,
    R: SnapshotRepository,
{
    /// Create a snapshot process over the given store and repository
    pub fn new(event_store: Arc<S>, snapshots: Arc<R>, factory: F) -> Self {
        Self {
            event_store,
            snapshots,
            factory,
        }
    }

    /// Capture and persist the identified subject's current state
    ///
    /// Rebuilds the aggregate from its full stream so the capture always
    /// reflects every recorded fact. Unknown subjects are an error.
    pub async fn generate_snapshot(
        &self,
        subject_id: &Identifier,
    ) -> Result<Snapshot, ReplayError> {
        let stream = self
            .event_store
            .load_event_stream(subject_id)
            .await?
            .ok_or_else(|| ReplayError::AggregateNotFound(subject_id.value().to_string()))?;
        let aggregate = self.factory.instance_of(subject_id, stream.events())?;
        let snapshot = Snapshot::of(&aggregate)?;
        self.snapshots.save_snapshot(snapshot.clone()).await?;
        info!(
            subject = subject_id.value(),
            commit = snapshot.commit_version(),
            events = stream.len(),
            "snapshot generated"
        );
        Ok(snapshot)
    }
}
