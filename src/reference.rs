// Copyright 2025 Cowboy AI, LLC.

//! Versioned references between entities
//!
//! An entity reference is the versioned relation from an owning entity to
//! an optional referenced entity. Like any mutable property, changing the
//! relation produces a new immutable version linking the superseded one.

use crate::entity::Entity;
use crate::errors::{DomainError, DomainResult};
use crate::history::{HistoryState, VersionChain, VersionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A versioned relation from an owning entity to a referenced entity
///
/// The referenced side is optional: a reference may exist before the
/// related entity is known. Equality considers the owner only, so one
/// owner has one logical reference regardless of what it currently
/// points at.
///
/// # Examples
///
/// ```rust
/// use fact_domain::{Entity, EntityReference, Identifier};
///
/// let order = Entity::with_id(Identifier::new("uid", "order-1").unwrap());
/// let customer = Entity::with_id(Identifier::new("uid", "customer-9").unwrap());
///
/// let relation = EntityReference::new(order, Some(customer));
/// assert!(relation.referenced_relation().is_some());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityReference {
    owner: Entity,
    chain: VersionChain<Option<Entity>>,
}

impl EntityReference {
    /// Create the first committed version of a reference
    pub fn new(owner: Entity, referenced: Option<Entity>) -> Self {
        Self::with_history(owner, referenced, None, Vec::new())
    }

    /// Create a reference version with an explicit status and predecessors
    ///
    /// The status defaults to COMMITTED. Predecessors belonging to another
    /// owner are ignored; a relation's history never mixes owners.
    pub fn with_history(
        owner: Entity,
        referenced: Option<Entity>,
        history_status: Option<HistoryState>,
        prior: Vec<EntityReference>,
    ) -> Self {
        let mut chain =
            VersionChain::seed(referenced, history_status.unwrap_or_default(), Utc::now());
        let chains: Vec<_> = prior
            .into_iter()
            .filter(|p| p.owner == owner)
            .map(|p| p.chain)
            .collect();
        if !chains.is_empty() {
            chain.replace_predecessors(chains);
        }
        Self { owner, chain }
    }

    /// The entity this relation belongs to
    pub fn owner(&self) -> &Entity {
        &self.owner
    }

    /// The entity currently referenced, if any
    pub fn referenced_relation(&self) -> Option<&Entity> {
        self.chain.payload().as_ref()
    }

    /// The current version's standing
    pub fn history_status(&self) -> HistoryState {
        self.chain.status()
    }

    /// When the current version was created
    pub fn changed_at(&self) -> DateTime<Utc> {
        self.chain.changed_at()
    }

    /// Monotonic id of the current version within its arena
    pub fn version_id(&self) -> VersionId {
        self.chain.head_id()
    }

    /// The direct predecessor versions, materialized as references
    pub fn changes_history(&self) -> Vec<EntityReference> {
        self.chain
            .direct_predecessor_ids()
            .iter()
            .filter_map(|id| self.chain.sub_chain(*id))
            .map(|chain| EntityReference {
                owner: self.owner.clone(),
                chain,
            })
            .collect()
    }

    /// Replace the predecessor versions
    ///
    /// An empty replacement set is a no-op, guarding against accidental
    /// history loss.
    pub fn update_changes_history(&mut self, history: Vec<EntityReference>) {
        let chains: Vec<_> = history.into_iter().map(|p| p.chain).collect();
        if chains.is_empty() {
            return;
        }
        self.chain.replace_predecessors(chains);
    }

    /// Produce the enhanced successor of this (old) version
    ///
    /// Fails when the candidate belongs to another owner, leaving both
    /// instances untouched.
    pub fn enhance_history_of(
        &self,
        new_version: EntityReference,
        new_status: Option<HistoryState>,
    ) -> DomainResult<EntityReference> {
        if new_version.owner != self.owner {
            return Err(DomainError::OwnerMismatch {
                expected: self.owner.to_string(),
                found: new_version.owner.to_string(),
            });
        }
        Ok(EntityReference {
            owner: new_version.owner,
            chain: self.chain.enhance(new_version.chain, new_status),
        })
    }
}

/// Equality considers the owning entity only
impl PartialEq for EntityReference {
    fn eq(&self, other: &Self) -> bool {
        self.owner == other.owner
    }
}

impl Eq for EntityReference {}

impl Hash for EntityReference {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.owner.hash(state);
    }
}

impl fmt::Display for EntityReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.referenced_relation() {
            Some(referenced) => write!(f, "{} -> {}", self.owner, referenced),
            None => write!(f, "{} -> <none>", self.owner),
        }
    }
}
