// Copyright 2025 Cowboy AI, LLC.

//! Entity types with identity and creation lifecycle

use crate::errors::{DomainError, DomainResult};
use crate::identifiers::Identifier;
use crate::reference::EntityReference;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// An immutable historical fact holding only identifying information
///
/// Entities carry identity that persists across time and nothing else:
/// mutable attributes live in versioned properties owned by the entity,
/// never on the entity itself. Once constructed, an entity is never
/// changed in place.
///
/// # Examples
///
/// ```rust
/// use fact_domain::{Entity, Identifier};
///
/// let id = Identifier::new("uid", "order-1").unwrap();
/// let order = Entity::with_id(id.clone());
/// assert_eq!(order.identified().unwrap(), id);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    identified_by: Vec<Identifier>,
    created_at: DateTime<Utc>,
}

impl Entity {
    /// Create an entity identified by one or more identifiers
    ///
    /// The set must not be empty; a child fact typically carries its own
    /// identifier plus the one inherited from its parent.
    pub fn new(identified_by: Vec<Identifier>) -> DomainResult<Self> {
        if identified_by.is_empty() {
            return Err(DomainError::missing("identified_by"));
        }
        Ok(Self {
            identified_by,
            created_at: Utc::now(),
        })
    }

    /// Create an entity identified by a single identifier
    pub fn with_id(id: Identifier) -> Self {
        Self {
            identified_by: vec![id],
            created_at: Utc::now(),
        }
    }

    /// Get the identifiers this entity is known by
    pub fn identifiers(&self) -> &[Identifier] {
        &self.identified_by
    }

    /// Derive the canonical identifier from the owned identifier set
    ///
    /// Several identifiers combine into one derived identifier; a single
    /// identifier passes through unchanged.
    pub fn identified(&self) -> DomainResult<Identifier> {
        Identifier::combined(&self.identified_by)
    }

    /// When this entity was created
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Create a reference slot owned by this entity with no referenced
    /// relation resolved yet
    pub fn reference(&self) -> EntityReference {
        EntityReference::new(self.clone(), None)
    }
}

/// Equality considers identifying information only, never the creation
/// timestamp: the same fact observed twice is the same fact.
impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.identified_by == other.identified_by
    }
}

impl Eq for Entity {}

impl Hash for Entity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identified_by.hash(state);
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.identified() {
            Ok(id) => write!(f, "{id}"),
            Err(_) => write!(f, "<unidentified>"),
        }
    }
}
