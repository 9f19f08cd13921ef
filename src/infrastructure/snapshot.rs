//! Aggregate snapshots and their storage contract

use crate::aggregate::Aggregate;
use crate::errors::{DomainError, DomainResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

/// Errors that can occur when working with snapshot storage
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Failed to serialize or deserialize snapshot data
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// General storage operation failed
    #[error("Storage error: {0}")]
    StorageError(String),
}

/// Full-state capture of an aggregate at a known point in its history
///
/// The commit version is the identifier value of the last change event the
/// captured state had applied; replay resumes strictly after that event.
/// Immutable once taken.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    versioned_object_uid: String,
    commit_version: String,
    taken_at: DateTime<Utc>,
    body: serde_json::Value,
}

impl Snapshot {
    /// Capture the current state of an aggregate
    ///
    /// Fails with invalid argument when the aggregate cannot derive its
    /// identifier or has no change event applied yet; a snapshot of a
    /// stateless aggregate would have no replay cursor.
    pub fn of<A>(aggregate: &A) -> DomainResult<Snapshot>
    where
        A: Aggregate + Serialize,
    {
        let uid = aggregate.identified()?;
        let commit = aggregate
            .commit_version()
            .ok_or_else(|| DomainError::missing("commit_version"))?;
        let body = serde_json::to_value(aggregate)?;
        Ok(Self {
            versioned_object_uid: uid.value().to_string(),
            commit_version: commit.value().to_string(),
            taken_at: Utc::now(),
            body,
        })
    }

    /// Identifier value of the captured subject
    pub fn subject_uid(&self) -> &str {
        &self.versioned_object_uid
    }

    /// Identifier value of the last change event the captured state applied
    pub fn commit_version(&self) -> &str {
        &self.commit_version
    }

    /// When the capture was taken
    pub fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }

    /// The serialized aggregate state
    pub fn body(&self) -> &serde_json::Value {
        &self.body
    }

    /// Rebuild the captured aggregate state from the body
    pub fn restore<A: DeserializeOwned>(&self) -> DomainResult<A> {
        Ok(serde_json::from_value(self.body.clone())?)
    }
}

/// Two snapshots are the same capture iff subject and commit version match
impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        self.versioned_object_uid == other.versioned_object_uid
            && self.commit_version == other.commit_version
    }
}

impl Eq for Snapshot {}

impl Hash for Snapshot {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.versioned_object_uid.hash(state);
        self.commit_version.hash(state);
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "snapshot of {} at commit {}",
            self.versioned_object_uid, self.commit_version
        )
    }
}

/// Storage contract for aggregate snapshots
///
/// Retention and eviction are the implementation's concern; the contract
/// only promises access to the latest capture per subject.
#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// The latest snapshot taken of the identified subject, if any
    async fn get_latest_snapshot_by_id(
        &self,
        subject_uid: &str,
    ) -> Result<Option<Snapshot>, SnapshotError>;

    /// Persist a snapshot
    async fn save_snapshot(&self, snapshot: Snapshot) -> Result<(), SnapshotError>;
}

/// In-memory snapshot repository keeping the latest capture per subject
#[derive(Debug, Default)]
pub struct InMemorySnapshotRepository {
    snapshots: RwLock<HashMap<String, Snapshot>>,
}

impl InMemorySnapshotRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotRepository for InMemorySnapshotRepository {
    async fn get_latest_snapshot_by_id(
        &self,
        subject_uid: &str,
    ) -> Result<Option<Snapshot>, SnapshotError> {
        let snapshots = self.snapshots.read().await;
        Ok(snapshots.get(subject_uid).cloned())
    }

    async fn save_snapshot(&self, snapshot: Snapshot) -> Result<(), SnapshotError> {
        debug!(
            subject = snapshot.subject_uid(),
            commit = snapshot.commit_version(),
            "snapshot saved"
        );
        let mut snapshots = self.snapshots.write().await;
        snapshots.insert(snapshot.subject_uid().to_string(), snapshot);
        Ok(())
    }
}
