// Copyright 2025 Cowboy AI, LLC.

//! Version history arena shared by mutable properties and entity references
//!
//! Every versioned value is an arena of immutable version records keyed by a
//! monotonic version id. A record stores its payload, a history status, a
//! creation timestamp, and the ids of its direct predecessors. The arena is a
//! plain value: cloning deep-copies it and serialization never recurses
//! through object references, even when merged versions give the history a
//! DAG shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Standing of one property version relative to concurrent edits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HistoryState {
    /// Current official value, the only state considered "current"
    #[default]
    Committed,
    /// Superseded value kept for traceability
    Archived,
    /// Value produced by resolving concurrent versions
    Merged,
    /// Value abandoned without ever being committed
    Cancelled,
}

impl fmt::Display for HistoryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HistoryState::Committed => "COMMITTED",
            HistoryState::Archived => "ARCHIVED",
            HistoryState::Merged => "MERGED",
            HistoryState::Cancelled => "CANCELLED",
        };
        write!(f, "{label}")
    }
}

/// Monotonic identifier of one version record within its chain
///
/// Ids only grow as versions are created; the head of a chain always
/// carries the highest id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VersionId(u64);

impl VersionId {
    /// First id assigned in a fresh chain
    pub const INITIAL: VersionId = VersionId(0);

    /// Get the numeric id
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    fn offset_by(self, offset: u64) -> VersionId {
        VersionId(self.0 + offset)
    }

    fn next(self) -> VersionId {
        VersionId(self.0 + 1)
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// One immutable version of a value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionRecord<P> {
    payload: P,
    history_status: HistoryState,
    changed_at: DateTime<Utc>,
    predecessors: BTreeSet<VersionId>,
}

impl<P> VersionRecord<P> {
    /// Create a record with no predecessors
    pub fn new(payload: P, history_status: HistoryState, changed_at: DateTime<Utc>) -> Self {
        Self {
            payload,
            history_status,
            changed_at,
            predecessors: BTreeSet::new(),
        }
    }

    /// The value this version carries
    pub fn payload(&self) -> &P {
        &self.payload
    }

    /// The version's standing relative to concurrent edits
    pub fn history_status(&self) -> HistoryState {
        self.history_status
    }

    /// When this version was created
    pub fn changed_at(&self) -> DateTime<Utc> {
        self.changed_at
    }

    /// Ids of the direct predecessor versions
    pub fn predecessors(&self) -> &BTreeSet<VersionId> {
        &self.predecessors
    }
}

/// Arena of version records with a distinguished head (current) version
///
/// The head is stored apart from the predecessor arena so a chain can never
/// exist without a current version. Absorbing another chain re-keys the
/// absorbed records above the existing maximum, keeping ids monotonic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionChain<P> {
    current: VersionRecord<P>,
    current_id: VersionId,
    records: BTreeMap<VersionId, VersionRecord<P>>,
}

impl<P: Clone> VersionChain<P> {
    /// Start a chain from its first version
    pub fn seed(payload: P, history_status: HistoryState, changed_at: DateTime<Utc>) -> Self {
        Self {
            current: VersionRecord::new(payload, history_status, changed_at),
            current_id: VersionId::INITIAL,
            records: BTreeMap::new(),
        }
    }

    /// The current version record
    pub fn head(&self) -> &VersionRecord<P> {
        &self.current
    }

    /// Id of the current version
    pub fn head_id(&self) -> VersionId {
        self.current_id
    }

    /// Payload of the current version
    pub fn payload(&self) -> &P {
        &self.current.payload
    }

    /// History status of the current version
    pub fn status(&self) -> HistoryState {
        self.current.history_status
    }

    /// Creation time of the current version
    pub fn changed_at(&self) -> DateTime<Utc> {
        self.current.changed_at
    }

    pub(crate) fn set_status(&mut self, status: HistoryState) {
        self.current.history_status = status;
    }

    /// Ids of the current version's direct predecessors
    pub fn direct_predecessor_ids(&self) -> &BTreeSet<VersionId> {
        &self.current.predecessors
    }

    /// Look up one record, the head included
    pub fn record(&self, id: VersionId) -> Option<&VersionRecord<P>> {
        if id == self.current_id {
            Some(&self.current)
        } else {
            self.records.get(&id)
        }
    }

    /// All records in id order, the head last
    pub fn all_records(&self) -> impl Iterator<Item = (VersionId, &VersionRecord<P>)> {
        self.records
            .iter()
            .map(|(id, record)| (*id, record))
            .chain(std::iter::once((self.current_id, &self.current)))
    }

    /// Number of versions in the chain, the head included
    pub fn len(&self) -> usize {
        self.records.len() + 1
    }

    /// Whether the chain holds only its first version
    pub fn is_initial(&self) -> bool {
        self.records.is_empty()
    }

    /// Extract the sub-chain headed by one predecessor version
    ///
    /// The returned chain keeps the original ids and contains exactly the
    /// records reachable from the requested head. `None` when the id is
    /// unknown or names the current head itself.
    pub fn sub_chain(&self, head: VersionId) -> Option<VersionChain<P>> {
        let head_record = self.records.get(&head)?.clone();

        let mut reachable = BTreeMap::new();
        let mut pending: Vec<VersionId> = head_record.predecessors.iter().copied().collect();
        while let Some(id) = pending.pop() {
            if reachable.contains_key(&id) {
                continue;
            }
            if let Some(record) = self.records.get(&id) {
                pending.extend(record.predecessors.iter().copied());
                reachable.insert(id, record.clone());
            }
        }

        Some(VersionChain {
            current: head_record,
            current_id: head,
            records: reachable,
        })
    }

    /// Produce the enhanced successor chain of this (old) chain
    ///
    /// The candidate chain is absorbed with its ids re-keyed above this
    /// chain's maximum; the candidate's head becomes the new current version
    /// and gains this chain's head, plus that head's own direct
    /// predecessors, as direct predecessors. This chain is left untouched.
    /// An optional status overwrites the new head's standing.
    pub fn enhance(
        &self,
        candidate: VersionChain<P>,
        new_status: Option<HistoryState>,
    ) -> VersionChain<P> {
        let mut records = self.records.clone();
        let old_head_id = self.current_id;
        records.insert(old_head_id, self.current.clone());

        let offset = old_head_id.next().as_u64();
        for (id, record) in candidate.records {
            records.insert(
                id.offset_by(offset),
                VersionRecord {
                    payload: record.payload,
                    history_status: record.history_status,
                    changed_at: record.changed_at,
                    predecessors: record
                        .predecessors
                        .iter()
                        .map(|p| p.offset_by(offset))
                        .collect(),
                },
            );
        }

        let mut predecessors: BTreeSet<VersionId> = candidate
            .current
            .predecessors
            .iter()
            .map(|p| p.offset_by(offset))
            .collect();
        predecessors.extend(self.current.predecessors.iter().copied());
        predecessors.insert(old_head_id);

        let current = VersionRecord {
            payload: candidate.current.payload,
            history_status: new_status.unwrap_or(candidate.current.history_status),
            changed_at: candidate.current.changed_at,
            predecessors,
        };

        VersionChain {
            current,
            current_id: candidate.current_id.offset_by(offset),
            records,
        }
    }

    /// Replace the predecessor structure with the given source chains
    ///
    /// Every source chain is absorbed whole and the source heads become the
    /// current version's direct predecessors. Ids are re-assigned to stay
    /// monotonic, the current version keeping the highest.
    pub fn replace_predecessors(&mut self, sources: Vec<VersionChain<P>>) {
        let mut records = BTreeMap::new();
        let mut heads = BTreeSet::new();
        let mut next_offset: u64 = 0;

        for source in sources {
            let offset = next_offset;
            let head_id = source.current_id.offset_by(offset);
            let mut max_id = head_id;
            for (id, record) in source.records {
                let remapped_id = id.offset_by(offset);
                max_id = max_id.max(remapped_id);
                records.insert(
                    remapped_id,
                    VersionRecord {
                        payload: record.payload,
                        history_status: record.history_status,
                        changed_at: record.changed_at,
                        predecessors: record
                            .predecessors
                            .iter()
                            .map(|p| p.offset_by(offset))
                            .collect(),
                    },
                );
            }
            records.insert(
                head_id,
                VersionRecord {
                    payload: source.current.payload,
                    history_status: source.current.history_status,
                    changed_at: source.current.changed_at,
                    predecessors: source
                        .current
                        .predecessors
                        .iter()
                        .map(|p| p.offset_by(offset))
                        .collect(),
                },
            );
            heads.insert(head_id);
            next_offset = max_id.next().as_u64();
        }

        self.records = records;
        self.current.predecessors = heads;
        self.current_id = VersionId(next_offset);
    }
}
