// Copyright 2025 Cowboy AI, LLC.

//! Identifier types for historical facts and aggregates

use crate::errors::{DomainError, DomainResult};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifying name assigned to derived and generated identifiers when no
/// caller-supplied name applies
pub const DEFAULT_IDENTIFIER_NAME: &str = "identifier_id";

/// Location-independent identifying information based on a single text chain
///
/// An identifier is a (name, value) pair compared by value. It carries no
/// storage location and no lifecycle of its own; entities own one or more of
/// them and derive a canonical identifier from the set.
///
/// # Examples
///
/// ```
/// use fact_domain::Identifier;
///
/// let id = Identifier::new("uid", "7f3a").unwrap();
/// assert_eq!(id.name(), "uid");
/// assert_eq!(id.value(), "7f3a");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier {
    name: String,
    value: String,
}

impl Identifier {
    /// Create an identifier from a name and a value
    ///
    /// Both parts are mandatory and must be non-empty.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> DomainResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(DomainError::missing("name"));
        }
        let value = value.into();
        if value.is_empty() {
            return Err(DomainError::missing("value"));
        }
        Ok(Self { name, value })
    }

    /// Derive one identifier from a set of source identifiers
    ///
    /// The derived value is the concatenation of the source values in order.
    /// When every source carries the same identifying name the derived
    /// identifier keeps it; otherwise it is named with
    /// [`DEFAULT_IDENTIFIER_NAME`]. Used when a child fact's identity is
    /// partially derived from its parent's.
    ///
    /// # Examples
    ///
    /// ```
    /// use fact_domain::Identifier;
    ///
    /// let parent = Identifier::new("uid", "p1").unwrap();
    /// let child = Identifier::new("uid", "c1").unwrap();
    /// let combined = Identifier::combined(&[parent, child]).unwrap();
    /// assert_eq!(combined.name(), "uid");
    /// assert_eq!(combined.value(), "p1c1");
    /// ```
    pub fn combined(based_on: &[Identifier]) -> DomainResult<Self> {
        if based_on.is_empty() {
            return Err(DomainError::missing("based_on"));
        }
        let mut combined_value = String::new();
        let mut unique_name: Option<&str> = None;
        let mut unique_name_found = true;
        for id in based_on {
            combined_value.push_str(&id.value);
            match unique_name {
                Some(name) => {
                    if name != id.name {
                        unique_name_found = false;
                    }
                }
                None => unique_name = Some(&id.name),
            }
        }
        let name = match unique_name {
            Some(name) if unique_name_found => name,
            _ => DEFAULT_IDENTIFIER_NAME,
        };
        Identifier::new(name, combined_value)
    }

    /// Generate a technical identifier
    ///
    /// The value concatenates the current epoch milliseconds, the optional
    /// salt, and a random UUID, giving uniqueness plus rough creation-time
    /// ordering. The name is [`DEFAULT_IDENTIFIER_NAME`].
    pub fn generate(salt: Option<&str>) -> Self {
        let mut value = Utc::now().timestamp_millis().to_string();
        if let Some(salt) = salt {
            if !salt.is_empty() {
                value.push_str(salt);
            }
        }
        value.push_str(&Uuid::new_v4().to_string());
        Self {
            name: DEFAULT_IDENTIFIER_NAME.to_string(),
            value,
        }
    }

    /// Get the identifying name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the identifying value
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}
