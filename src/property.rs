// Copyright 2025 Cowboy AI, LLC.

//! Versioned mutable properties owned by entities
//!
//! A mutable property is not mutated in place: it is a named bundle of
//! attribute values whose every change produces a new immutable version,
//! with the superseded versions kept as predecessors in the version arena.

use crate::entity::Entity;
use crate::errors::{DomainError, DomainResult};
use crate::history::{HistoryState, VersionChain, VersionId, VersionRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Schema tag naming the concrete kind of a property
///
/// History chains are homogeneous: versions of one property all carry the
/// same kind, and enhancement across kinds is rejected. Typed state views
/// validate the kind before wrapping a raw property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyKind(String);

impl PropertyKind {
    /// Create a kind tag
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the tag as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PropertyKind {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One attribute value inside a property's value map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    /// Free text
    Text(String),
    /// Boolean flag
    Flag(bool),
    /// Signed integer
    Integer(i64),
    /// Floating point number
    Decimal(f64),
    /// Point in time
    Timestamp(DateTime<Utc>),
}

impl AttributeValue {
    /// Text content, when this value is text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Flag content, when this value is a flag
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            AttributeValue::Flag(value) => Some(*value),
            _ => None,
        }
    }

    /// Integer content, when this value is an integer
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            AttributeValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Decimal content, when this value is a decimal
    pub fn as_decimal(&self) -> Option<f64> {
        match self {
            AttributeValue::Decimal(value) => Some(*value),
            _ => None,
        }
    }

    /// Timestamp content, when this value is a timestamp
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            AttributeValue::Timestamp(value) => Some(*value),
            _ => None,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Flag(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Integer(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Decimal(value)
    }
}

impl From<DateTime<Utc>> for AttributeValue {
    fn from(value: DateTime<Utc>) -> Self {
        AttributeValue::Timestamp(value)
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Text(value) => write!(f, "{value}"),
            AttributeValue::Flag(value) => write!(f, "{value}"),
            AttributeValue::Integer(value) => write!(f, "{value}"),
            AttributeValue::Decimal(value) => write!(f, "{value}"),
            AttributeValue::Timestamp(value) => write!(f, "{value}"),
        }
    }
}

/// Attribute map carried by one property version
pub type AttributeMap = BTreeMap<String, AttributeValue>;

/// A versioned bundle of attribute values owned by an entity
///
/// Immutable after construction. A "change" constructs a new instance whose
/// predecessor arena links the superseded version(s); concurrent edits
/// resolved by a merge give the arena a DAG shape. Functional equality
/// compares owner, kind, history status, and the current attribute map,
/// never the predecessor chain: two equivalent values compare equal no
/// matter how they were reached.
///
/// # Examples
///
/// ```rust
/// use fact_domain::{AttributeMap, Entity, Identifier, MutableProperty, PropertyKind};
///
/// let owner = Entity::with_id(Identifier::new("uid", "order-1").unwrap());
/// let mut value = AttributeMap::new();
/// value.insert("label".to_string(), "priority shipment".into());
///
/// let label = MutableProperty::new(owner, PropertyKind::new("descriptor"), value).unwrap();
/// assert_eq!(
///     label.current_value()["label"].as_text(),
///     Some("priority shipment")
/// );
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutableProperty {
    owner: Entity,
    kind: PropertyKind,
    chain: VersionChain<AttributeMap>,
}

impl MutableProperty {
    /// Create the first committed version of a property
    ///
    /// The attribute map must not be empty: a property with nothing to say
    /// about its owner is not a fact.
    pub fn new(owner: Entity, kind: PropertyKind, value: AttributeMap) -> DomainResult<Self> {
        Self::with_history(owner, kind, value, None, Vec::new())
    }

    /// Create a property version with an explicit status and predecessors
    ///
    /// The status defaults to COMMITTED. Every predecessor must carry the
    /// same kind as the new version; history chains are homogeneous.
    pub fn with_history(
        owner: Entity,
        kind: PropertyKind,
        value: AttributeMap,
        history_status: Option<HistoryState>,
        prior: Vec<MutableProperty>,
    ) -> DomainResult<Self> {
        if value.is_empty() {
            return Err(DomainError::missing("value"));
        }
        for predecessor in &prior {
            if predecessor.kind != kind {
                return Err(DomainError::HistoryTypeMismatch {
                    expected: kind.as_str().to_string(),
                    found: predecessor.kind.as_str().to_string(),
                });
            }
        }
        let mut chain =
            VersionChain::seed(value, history_status.unwrap_or_default(), Utc::now());
        if !prior.is_empty() {
            chain.replace_predecessors(prior.into_iter().map(|p| p.chain).collect());
        }
        Ok(Self { owner, kind, chain })
    }

    /// The entity this property belongs to
    pub fn owner(&self) -> &Entity {
        &self.owner
    }

    /// The property's schema tag
    pub fn kind(&self) -> &PropertyKind {
        &self.kind
    }

    /// The current version's attribute map
    ///
    /// Exposed by shared reference only; the property cannot be altered
    /// through the returned map.
    pub fn current_value(&self) -> &AttributeMap {
        self.chain.payload()
    }

    /// Look up one attribute of the current version
    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.chain.payload().get(key)
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

    /// All version records in id order, the current version last
    pub fn versions(&self) -> impl Iterator<Item = (VersionId, &VersionRecord<AttributeMap>)> {
        self.chain.all_records()
    }

    /// The direct predecessor versions, materialized as properties
    pub fn changes_history(&self) -> Vec<MutableProperty> {
        self.chain
            .direct_predecessor_ids()
            .iter()
            .filter_map(|id| self.chain.sub_chain(*id))
            .map(|chain| MutableProperty {
                owner: self.owner.clone(),
                kind: self.kind.clone(),
                chain,
            })
            .collect()
    }

    /// Replace the predecessor versions
    ///
    /// An empty replacement set is a no-op, guarding against accidental
    /// history loss. Predecessors of a foreign kind are rejected.
    pub fn update_changes_history(&mut self, history: Vec<MutableProperty>) -> DomainResult<()> {
        if history.is_empty() {
            return Ok(());
        }
        for predecessor in &history {
            if predecessor.kind != self.kind {
                return Err(DomainError::HistoryTypeMismatch {
                    expected: self.kind.as_str().to_string(),
                    found: predecessor.kind.as_str().to_string(),
                });
            }
        }
        self.chain
            .replace_predecessors(history.into_iter().map(|p| p.chain).collect());
        Ok(())
    }

    /// Produce the enhanced successor of this (old) version
    ///
    /// The candidate new version gains this version, and this version's own
    /// direct predecessors, as predecessors; an optional status overwrites
    /// the candidate's standing. Fails when the candidate's kind differs
    /// from this version's kind, leaving both instances untouched.
    pub fn enhance_history_of(
        &self,
        new_version: MutableProperty,
        new_status: Option<HistoryState>,
    ) -> DomainResult<MutableProperty> {
        if new_version.kind != self.kind {
            return Err(DomainError::HistoryTypeMismatch {
                expected: self.kind.as_str().to_string(),
                found: new_version.kind.as_str().to_string(),
            });
        }
        Ok(MutableProperty {
            owner: new_version.owner,
            kind: new_version.kind,
            chain: self.chain.enhance(new_version.chain, new_status),
        })
    }
}

/// Functional equality: owner, kind, status, and current attribute map.
/// Predecessor chains and timestamps are excluded on purpose.
impl PartialEq for MutableProperty {
    fn eq(&self, other: &Self) -> bool {
        self.owner == other.owner
            && self.kind == other.kind
            && self.history_status() == other.history_status()
            && self.current_value() == other.current_value()
    }
}

impl fmt::Display for MutableProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} of {} ({} versions)",
            self.history_status(),
            self.kind,
            self.owner,
            self.chain.len()
        )
    }
}
