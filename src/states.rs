// Copyright 2025 Cowboy AI, LLC.

//! Typed views over versioned property state
//!
//! Activity and completion state are schema-tagged properties with a known
//! attribute layout. The views validate the layout on construction and on
//! conversion from a raw property, then expose typed accessors while the
//! underlying version arena keeps the full change history.

use crate::entity::Entity;
use crate::errors::{DomainError, DomainResult};
use crate::history::HistoryState;
use crate::property::{AttributeMap, MutableProperty, PropertyKind};
use crate::reference::EntityReference;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether the owning entity is operationally active
///
/// # Examples
///
/// ```rust
/// use fact_domain::{ActivityState, Entity, Identifier};
///
/// let tenant = Entity::with_id(Identifier::new("uid", "tenant-1").unwrap());
/// let state = ActivityState::new(&tenant.reference(), true).unwrap();
/// assert!(state.is_active());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityState {
    property: MutableProperty,
}

impl ActivityState {
    /// Schema tag carried by every activity state version
    pub const KIND: &'static str = "activity-state";

    const ACTIVE_KEY: &'static str = "active";

    /// Create the first committed activity state of a relation's owner
    pub fn new(owner: &EntityReference, is_active: bool) -> DomainResult<Self> {
        Self::with_history(owner, is_active, None, Vec::new())
    }

    /// Create an activity state with an explicit status and predecessors
    pub fn with_history(
        owner: &EntityReference,
        is_active: bool,
        history_status: Option<HistoryState>,
        prior: Vec<ActivityState>,
    ) -> DomainResult<Self> {
        let mut value = AttributeMap::new();
        value.insert(Self::ACTIVE_KEY.to_string(), is_active.into());
        let property = MutableProperty::with_history(
            owner.owner().clone(),
            PropertyKind::new(Self::KIND),
            value,
            history_status,
            prior.into_iter().map(|p| p.property).collect(),
        )?;
        Ok(Self { property })
    }

    /// Current activation flag
    pub fn is_active(&self) -> bool {
        self.property
            .attribute(Self::ACTIVE_KEY)
            .and_then(|v| v.as_flag())
            .unwrap_or(false)
    }

    /// The entity this state describes
    pub fn owner(&self) -> &Entity {
        self.property.owner()
    }

    /// The current version's standing
    pub fn history_status(&self) -> HistoryState {
        self.property.history_status()
    }

    /// The direct predecessor versions as raw properties
    pub fn changes_history(&self) -> Vec<MutableProperty> {
        self.property.changes_history()
    }

    /// Verify this state may be applied to the expected owner
    pub fn check_conformity(&self, expected_owner: &Entity) -> DomainResult<()> {
        if self.owner() != expected_owner {
            return Err(DomainError::OwnerMismatch {
                expected: expected_owner.to_string(),
                found: self.owner().to_string(),
            });
        }
        Ok(())
    }

    /// Produce the enhanced successor of this (old) state
    pub fn enhance_history_of(
        &self,
        new_version: ActivityState,
        new_status: Option<HistoryState>,
    ) -> DomainResult<ActivityState> {
        let property = self
            .property
            .enhance_history_of(new_version.property, new_status)?;
        Ok(Self { property })
    }

    /// Borrow the underlying versioned property
    pub fn as_property(&self) -> &MutableProperty {
        &self.property
    }

    /// Unwrap into the underlying versioned property
    pub fn into_property(self) -> MutableProperty {
        self.property
    }
}

impl TryFrom<MutableProperty> for ActivityState {
    type Error = DomainError;

    /// Validate the schema tag and attribute layout of a raw property
    fn try_from(property: MutableProperty) -> DomainResult<Self> {
        if property.kind().as_str() != Self::KIND {
            return Err(DomainError::HistoryTypeMismatch {
                expected: Self::KIND.to_string(),
                found: property.kind().as_str().to_string(),
            });
        }
        if property
            .attribute(Self::ACTIVE_KEY)
            .and_then(|v| v.as_flag())
            .is_none()
        {
            return Err(DomainError::ValidationError(format!(
                "activity state requires a boolean '{}' attribute",
                Self::ACTIVE_KEY
            )));
        }
        Ok(Self { property })
    }
}

impl From<ActivityState> for MutableProperty {
    fn from(state: ActivityState) -> Self {
        state.property
    }
}

impl fmt::Display for ActivityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            if self.is_active() { "active" } else { "inactive" }
        )
    }
}

/// How far the owning entity's lifecycle has progressed
///
/// Carries a mandatory state name and an optional progress percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionState {
    property: MutableProperty,
}

impl CompletionState {
    /// Schema tag carried by every completion state version
    pub const KIND: &'static str = "completion-state";

    const NAME_KEY: &'static str = "name";
    const PERCENTAGE_KEY: &'static str = "percentage";

    /// Create the first committed completion state of a relation's owner
    ///
    /// The state name is mandatory; the progress percentage is not.
    pub fn new(
        owner: &EntityReference,
        name: &str,
        percentage: Option<f64>,
    ) -> DomainResult<Self> {
        Self::with_history(owner, name, percentage, None, Vec::new())
    }

    /// Create a completion state with an explicit status and predecessors
    pub fn with_history(
        owner: &EntityReference,
        name: &str,
        percentage: Option<f64>,
        history_status: Option<HistoryState>,
        prior: Vec<CompletionState>,
    ) -> DomainResult<Self> {
        if name.trim().is_empty() {
            return Err(DomainError::missing("name"));
        }
        let mut value = AttributeMap::new();
        value.insert(Self::NAME_KEY.to_string(), name.into());
        if let Some(percentage) = percentage {
            value.insert(Self::PERCENTAGE_KEY.to_string(), percentage.into());
        }
        let property = MutableProperty::with_history(
            owner.owner().clone(),
            PropertyKind::new(Self::KIND),
            value,
            history_status,
            prior.into_iter().map(|p| p.property).collect(),
        )?;
        Ok(Self { property })
    }

    /// Current state name
    pub fn name(&self) -> &str {
        self.property
            .attribute(Self::NAME_KEY)
            .and_then(|v| v.as_text())
            .unwrap_or_default()
    }

    /// Current progress percentage, when one was recorded
    pub fn percentage(&self) -> Option<f64> {
        self.property
            .attribute(Self::PERCENTAGE_KEY)
            .and_then(|v| v.as_decimal())
    }

    /// The entity this state describes
    pub fn owner(&self) -> &Entity {
        self.property.owner()
    }

    /// The current version's standing
    pub fn history_status(&self) -> HistoryState {
        self.property.history_status()
    }

    /// The direct predecessor versions as raw properties
    pub fn changes_history(&self) -> Vec<MutableProperty> {
        self.property.changes_history()
    }

    /// Verify this state may be applied to the expected owner
    ///
    /// Rejects a foreign owner, an empty state name, and a percentage that
    /// is negative or not a number.
    pub fn check_conformity(&self, expected_owner: &Entity) -> DomainResult<()> {
        if self.owner() != expected_owner {
            return Err(DomainError::OwnerMismatch {
                expected: expected_owner.to_string(),
                found: self.owner().to_string(),
            });
        }
        if self.name().trim().is_empty() {
            return Err(DomainError::ValidationError(
                "completion state requires a name".to_string(),
            ));
        }
        if let Some(percentage) = self.percentage() {
            if percentage.is_nan() {
                return Err(DomainError::ValidationError(
                    "completion percentage is not a number".to_string(),
                ));
            }
            if percentage < 0.0 {
                return Err(DomainError::ValidationError(format!(
                    "completion percentage {percentage} is negative"
                )));
            }
        }
        Ok(())
    }

    /// Produce the enhanced successor of this (old) state
    pub fn enhance_history_of(
        &self,
        new_version: CompletionState,
        new_status: Option<HistoryState>,
    ) -> DomainResult<CompletionState> {
        let property = self
            .property
            .enhance_history_of(new_version.property, new_status)?;
        Ok(Self { property })
    }

    /// Borrow the underlying versioned property
    pub fn as_property(&self) -> &MutableProperty {
        &self.property
    }

    /// Unwrap into the underlying versioned property
    pub fn into_property(self) -> MutableProperty {
        self.property
    }
}

impl TryFrom<MutableProperty> for CompletionState {
    type Error = DomainError;

    /// Validate the schema tag and attribute layout of a raw property
    fn try_from(property: MutableProperty) -> DomainResult<Self> {
        if property.kind().as_str() != Self::KIND {
            return Err(DomainError::HistoryTypeMismatch {
                expected: Self::KIND.to_string(),
                found: property.kind().as_str().to_string(),
            });
        }
        if property
            .attribute(Self::NAME_KEY)
            .and_then(|v| v.as_text())
            .is_none()
        {
            return Err(DomainError::ValidationError(format!(
                "completion state requires a text '{}' attribute",
                Self::NAME_KEY
            )));
        }
        Ok(Self { property })
    }
}

impl From<CompletionState> for MutableProperty {
    fn from(state: CompletionState) -> Self {
        state.property
    }
}

impl fmt::Display for CompletionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.percentage() {
            Some(percentage) => write!(f, "{} ({percentage}%)", self.name()),
            None => write!(f, "{}", self.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifiers::Identifier;

    fn entity(value: &str) -> Entity {
        Entity::with_id(Identifier::new("uid", value).unwrap())
    }

    /// Test activity state construction and typed access
    #[test]
    fn test_activity_state_roundtrip() {
        let tenant = entity("tenant-1");
        let state = ActivityState::new(&tenant.reference(), true).unwrap();

        assert!(state.is_active());
        assert_eq!(state.owner(), &tenant);
        assert_eq!(state.history_status(), HistoryState::Committed);
        assert_eq!(state.as_property().kind().as_str(), ActivityState::KIND);
    }

    /// Test conformity rejects a state describing another entity
    #[test]
    fn test_activity_conformity_checks_owner() {
        let tenant = entity("tenant-1");
        let other = entity("tenant-2");
        let state = ActivityState::new(&other.reference(), true).unwrap();

        let err = state.check_conformity(&tenant).unwrap_err();
        assert!(matches!(err, DomainError::OwnerMismatch { .. }));
        assert!(state.check_conformity(&other).is_ok());
    }

    /// Test enhancement keeps typed access over the grown history
    ///
    /// ```mermaid
    /// graph RL
    ///     D[deactivated] --> A[activated]
    /// ```
    #[test]
    fn test_activity_enhancement() {
        let tenant = entity("tenant-1");
        let activated = ActivityState::new(&tenant.reference(), true).unwrap();
        let deactivated = ActivityState::new(&tenant.reference(), false).unwrap();

        let current = activated.enhance_history_of(deactivated, None).unwrap();

        assert!(!current.is_active());
        assert_eq!(current.changes_history().len(), 1);
        assert_eq!(
            current.changes_history()[0]
                .attribute("active")
                .and_then(|v| v.as_flag()),
            Some(true)
        );
    }

    /// Test the validated view conversion from a raw property
    #[test]
    fn test_activity_view_validation() {
        let tenant = entity("tenant-1");
        let valid = ActivityState::new(&tenant.reference(), true)
            .unwrap()
            .into_property();
        assert!(ActivityState::try_from(valid).is_ok());

        let mut wrong_layout = AttributeMap::new();
        wrong_layout.insert("active".to_string(), "yes".into());
        let text_flag = MutableProperty::new(
            tenant.clone(),
            PropertyKind::new(ActivityState::KIND),
            wrong_layout,
        )
        .unwrap();
        let err = ActivityState::try_from(text_flag).unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));

        let mut value = AttributeMap::new();
        value.insert("name".to_string(), "started".into());
        let wrong_kind =
            MutableProperty::new(tenant, PropertyKind::new(CompletionState::KIND), value).unwrap();
        let err = ActivityState::try_from(wrong_kind).unwrap_err();
        assert!(matches!(err, DomainError::HistoryTypeMismatch { .. }));
    }

    /// Test completion state requires a name
    #[test]
    fn test_completion_requires_name() {
        let tenant = entity("tenant-1");
        let err = CompletionState::new(&tenant.reference(), "  ", None).unwrap_err();
        assert!(err.is_invalid_argument());

        let state = CompletionState::new(&tenant.reference(), "started", Some(25.0)).unwrap();
        assert_eq!(state.name(), "started");
        assert_eq!(state.percentage(), Some(25.0));
    }

    /// Test completion conformity rejects invalid percentages
    #[test]
    fn test_completion_conformity_checks_percentage() {
        let tenant = entity("tenant-1");

        let nan = CompletionState::new(&tenant.reference(), "broken", Some(f64::NAN)).unwrap();
        let err = nan.check_conformity(&tenant).unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));

        let negative =
            CompletionState::new(&tenant.reference(), "rewound", Some(-3.0)).unwrap();
        let err = negative.check_conformity(&tenant).unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));

        let zero = CompletionState::new(&tenant.reference(), "not started", Some(0.0)).unwrap();
        assert!(zero.check_conformity(&tenant).is_ok());

        let unmeasured = CompletionState::new(&tenant.reference(), "started", None).unwrap();
        assert!(unmeasured.check_conformity(&tenant).is_ok());
    }

    /// Test completion conformity rejects a foreign owner first
    #[test]
    fn test_completion_conformity_checks_owner() {
        let tenant = entity("tenant-1");
        let other = entity("tenant-2");
        let state = CompletionState::new(&other.reference(), "started", Some(10.0)).unwrap();

        let err = state.check_conformity(&tenant).unwrap_err();
        assert!(matches!(err, DomainError::OwnerMismatch { .. }));
    }

    /// Test completion enhancement preserves earlier progress in history
    #[test]
    fn test_completion_enhancement() {
        let tenant = entity("tenant-1");
        let started = CompletionState::new(&tenant.reference(), "started", Some(10.0)).unwrap();
        let reviewed = CompletionState::new(&tenant.reference(), "reviewed", Some(80.0)).unwrap();

        let current = started.enhance_history_of(reviewed, None).unwrap();

        assert_eq!(current.name(), "reviewed");
        assert_eq!(current.percentage(), Some(80.0));
        assert_eq!(current.changes_history().len(), 1);
    }
}
