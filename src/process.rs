// Copyright 2025 Cowboy AI, LLC.

//! Process aggregate built on the versioned-fact core
//!
//! A process is an event-sourced aggregate root: a child entity of a parent
//! domain object carrying a named descriptor, an activation state, and a
//! completion state, all as versioned properties. Live operations chain
//! property history and record change events; rehydration replays recorded
//! events through the same mutation entry point, collapsing linear history
//! to current values.

use crate::aggregate::{Aggregate, HydrationCapability, MutedAggregateFactory};
use crate::entity::Entity;
use crate::errors::{DomainError, DomainResult};
use crate::events::DomainEvent;
use crate::history::HistoryState;
use crate::identifiers::Identifier;
use crate::property::{AttributeMap, MutableProperty, PropertyKind};
use crate::reference::EntityReference;
use crate::states::{ActivityState, CompletionState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Named description of a process
///
/// A rename never overwrites: the previous descriptor version becomes a
/// predecessor of the new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessDescriptor {
    property: MutableProperty,
}

impl ProcessDescriptor {
    /// Schema tag carried by every process descriptor version
    pub const KIND: &'static str = "process-descriptor";

    const NAME_KEY: &'static str = "name";

    /// Create the first committed descriptor of a relation's owner
    pub fn new(owner: &EntityReference, name: &str) -> DomainResult<Self> {
        if name.trim().is_empty() {
            return Err(DomainError::missing("name"));
        }
        let mut value = AttributeMap::new();
        value.insert(Self::NAME_KEY.to_string(), name.into());
        let property = MutableProperty::new(
            owner.owner().clone(),
            PropertyKind::new(Self::KIND),
            value,
        )?;
        Ok(Self { property })
    }

    /// Current process name
    pub fn name(&self) -> &str {
        self.property
            .attribute(Self::NAME_KEY)
            .and_then(|v| v.as_text())
            .unwrap_or_default()
    }

    /// The entity this descriptor describes
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

    /// Produce the enhanced successor of this (old) descriptor
    pub fn enhance_history_of(
        &self,
        new_version: ProcessDescriptor,
        new_status: Option<HistoryState>,
    ) -> DomainResult<ProcessDescriptor> {
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

impl TryFrom<MutableProperty> for ProcessDescriptor {
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
                "process descriptor requires a text '{}' attribute",
                Self::NAME_KEY
            )));
        }
        Ok(Self { property })
    }
}

impl From<ProcessDescriptor> for MutableProperty {
    fn from(descriptor: ProcessDescriptor) -> Self {
        descriptor.property
    }
}

impl fmt::Display for ProcessDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Facts recorded about a process
///
/// Every state transition a process supports has exactly one variant here,
/// so replay dispatch is a total match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ProcessEvent {
    /// A process came into existence under a parent domain object
    Created {
        /// Unique identifier of this fact
        event_id: Identifier,
        /// Identifier of the created process
        process_id: Identifier,
        /// The parent domain object the process belongs to
        parent: Entity,
        /// Initial process name
        name: String,
        /// When the fact occurred
        occurred_at: DateTime<Utc>,
    },
    /// The process descriptor received a new name
    Renamed {
        /// Unique identifier of this fact
        event_id: Identifier,
        /// Identifier of the renamed process
        process_id: Identifier,
        /// The new name
        name: String,
        /// When the fact occurred
        occurred_at: DateTime<Utc>,
    },
    /// The process was activated or deactivated
    ActivationChanged {
        /// Unique identifier of this fact
        event_id: Identifier,
        /// Identifier of the changed process
        process_id: Identifier,
        /// The new activation flag
        active: bool,
        /// When the fact occurred
        occurred_at: DateTime<Utc>,
    },
    /// The process moved to another completion state
    CompletionChanged {
        /// Unique identifier of this fact
        event_id: Identifier,
        /// Identifier of the changed process
        process_id: Identifier,
        /// The new completion state name
        state_name: String,
        /// The new progress percentage, when measured
        percentage: Option<f64>,
        /// When the fact occurred
        occurred_at: DateTime<Utc>,
    },
}

impl DomainEvent for ProcessEvent {
    fn event_id(&self) -> &Identifier {
        match self {
            ProcessEvent::Created { event_id, .. }
            | ProcessEvent::Renamed { event_id, .. }
            | ProcessEvent::ActivationChanged { event_id, .. }
            | ProcessEvent::CompletionChanged { event_id, .. } => event_id,
        }
    }

    fn subject_id(&self) -> Option<&Identifier> {
        match self {
            ProcessEvent::Created { process_id, .. }
            | ProcessEvent::Renamed { process_id, .. }
            | ProcessEvent::ActivationChanged { process_id, .. }
            | ProcessEvent::CompletionChanged { process_id, .. } => Some(process_id),
        }
    }

    fn event_type(&self) -> &'static str {
        match self {
            ProcessEvent::Created { .. } => "ProcessCreated",
            ProcessEvent::Renamed { .. } => "ProcessRenamed",
            ProcessEvent::ActivationChanged { .. } => "ProcessActivationChanged",
            ProcessEvent::CompletionChanged { .. } => "ProcessCompletionChanged",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ProcessEvent::Created { occurred_at, .. }
            | ProcessEvent::Renamed { occurred_at, .. }
            | ProcessEvent::ActivationChanged { occurred_at, .. }
            | ProcessEvent::CompletionChanged { occurred_at, .. } => *occurred_at,
        }
    }
}

/// A fact is the fact named by its identifier; payload fields do not
/// participate in equality
impl PartialEq for ProcessEvent {
    fn eq(&self, other: &Self) -> bool {
        self.event_id() == other.event_id()
    }
}

impl Eq for ProcessEvent {}

impl Hash for ProcessEvent {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.event_id().hash(state);
    }
}

/// Event-sourced process aggregate
///
/// # Examples
///
/// ```rust
/// use fact_domain::{Entity, Identifier, Process};
///
/// let company = Entity::with_id(Identifier::new("uid", "company-7").unwrap());
/// let mut process = Process::create(
///     &company,
///     Identifier::new("uid", "process-1").unwrap(),
///     "order fulfilment",
/// )
/// .unwrap();
///
/// process.activate().unwrap();
/// assert!(process.is_active());
/// assert_eq!(process.change_events().len(), 2);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Process {
    parent: Entity,
    entity: Entity,
    descriptor: ProcessDescriptor,
    activation: ActivityState,
    completion: CompletionState,
    commit_version: Option<Identifier>,
    #[serde(skip)]
    change_events: Vec<ProcessEvent>,
}

impl Process {
    /// Completion state name a process starts its life in
    pub const INITIAL_COMPLETION: &'static str = "not started";

    /// Create a process under a parent domain object
    ///
    /// The new process starts inactive, in the initial completion state,
    /// with a creation fact pending in its change events.
    pub fn create(parent: &Entity, id: Identifier, name: &str) -> DomainResult<Self> {
        let mut process = Self::origin(parent.clone(), id, name)?;
        let event = ProcessEvent::Created {
            event_id: Identifier::generate(None),
            process_id: process.entity.identified()?,
            parent: parent.clone(),
            name: name.to_string(),
            occurred_at: Utc::now(),
        };
        process.record(event);
        Ok(process)
    }

    fn origin(parent: Entity, id: Identifier, name: &str) -> DomainResult<Self> {
        let entity = Entity::with_id(id);
        let reference = entity.reference();
        let descriptor = ProcessDescriptor::new(&reference, name)?;
        let activation = ActivityState::new(&reference, false)?;
        let completion = CompletionState::new(&reference, Self::INITIAL_COMPLETION, None)?;
        Ok(Self {
            parent,
            entity,
            descriptor,
            activation,
            completion,
            commit_version: None,
            change_events: Vec::new(),
        })
    }

    /// The parent domain object this process belongs to
    pub fn parent(&self) -> &Entity {
        &self.parent
    }

    /// The process's own identity
    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    /// Current process name
    pub fn name(&self) -> &str {
        self.descriptor.name()
    }

    /// The versioned descriptor
    pub fn descriptor(&self) -> &ProcessDescriptor {
        &self.descriptor
    }

    /// The versioned activation state
    pub fn activation(&self) -> &ActivityState {
        &self.activation
    }

    /// The versioned completion state
    pub fn completion(&self) -> &CompletionState {
        &self.completion
    }

    /// Whether the process is currently active
    pub fn is_active(&self) -> bool {
        self.activation.is_active()
    }

    /// Change events recorded by live operations, not yet appended to a store
    pub fn change_events(&self) -> &[ProcessEvent] {
        &self.change_events
    }

    /// Drain the pending change events for appending to a store
    pub fn take_change_events(&mut self) -> Vec<ProcessEvent> {
        std::mem::take(&mut self.change_events)
    }

    /// Give the process a new name
    ///
    /// The previous descriptor version becomes a predecessor of the new one
    /// and a rename fact is recorded.
    pub fn rename(&mut self, name: &str) -> DomainResult<()> {
        let candidate = ProcessDescriptor::new(&self.entity.reference(), name)?;
        self.descriptor = self.descriptor.enhance_history_of(candidate, None)?;
        let event = ProcessEvent::Renamed {
            event_id: Identifier::generate(None),
            process_id: self.entity.identified()?,
            name: name.to_string(),
            occurred_at: Utc::now(),
        };
        self.record(event);
        Ok(())
    }

    /// Mark the process operationally active
    pub fn activate(&mut self) -> DomainResult<()> {
        self.change_activation(true)
    }

    /// Mark the process operationally inactive
    pub fn deactivate(&mut self) -> DomainResult<()> {
        self.change_activation(false)
    }

    fn change_activation(&mut self, active: bool) -> DomainResult<()> {
        let candidate = ActivityState::new(&self.entity.reference(), active)?;
        candidate.check_conformity(&self.entity)?;
        self.activation = self.activation.enhance_history_of(candidate, None)?;
        let event = ProcessEvent::ActivationChanged {
            event_id: Identifier::generate(None),
            process_id: self.entity.identified()?,
            active,
            occurred_at: Utc::now(),
        };
        self.record(event);
        Ok(())
    }

    /// Move the process to another completion state
    ///
    /// The candidate state is conformity-checked first; on rejection the
    /// previously committed state stays untouched and no fact is recorded.
    pub fn change_completion(&mut self, state: CompletionState) -> DomainResult<()> {
        state.check_conformity(&self.entity)?;
        let event = ProcessEvent::CompletionChanged {
            event_id: Identifier::generate(None),
            process_id: self.entity.identified()?,
            state_name: state.name().to_string(),
            percentage: state.percentage(),
            occurred_at: Utc::now(),
        };
        self.completion = self.completion.enhance_history_of(state, None)?;
        self.record(event);
        Ok(())
    }

    fn record(&mut self, event: ProcessEvent) {
        self.commit_version = Some(event.event_id().clone());
        self.change_events.push(event);
    }

    fn check_subject(&self, event: &ProcessEvent) -> DomainResult<()> {
        let own_id = self.entity.identified()?;
        match event.subject_id() {
            Some(subject) if *subject == own_id => Ok(()),
            _ => Err(DomainError::InvalidOperation {
                reason: format!(
                    "event {} does not concern process {}",
                    event.event_id(),
                    own_id
                ),
            }),
        }
    }
}

impl HydrationCapability for Process {
    type Event = ProcessEvent;

    /// Apply one historical fact to the current state
    ///
    /// Replay replaces current values without growing property history:
    /// linear history collapses during rehydration, only merge branches
    /// are carried inside the version arenas themselves.
    fn mutate_when(&mut self, event: &ProcessEvent) -> DomainResult<()> {
        self.check_subject(event)?;
        match event {
            ProcessEvent::Created { .. } => {
                return Err(DomainError::InvalidOperation {
                    reason: "a creation fact cannot apply to an existing process".to_string(),
                });
            }
            ProcessEvent::Renamed { name, .. } => {
                self.descriptor = ProcessDescriptor::new(&self.entity.reference(), name)?;
            }
            ProcessEvent::ActivationChanged { active, .. } => {
                self.activation = ActivityState::new(&self.entity.reference(), *active)?;
            }
            ProcessEvent::CompletionChanged {
                state_name,
                percentage,
                ..
            } => {
                self.completion =
                    CompletionState::new(&self.entity.reference(), state_name, *percentage)?;
            }
        }
        self.commit_version = Some(event.event_id().clone());
        Ok(())
    }
}

impl Aggregate for Process {
    fn identified(&self) -> DomainResult<Identifier> {
        self.entity.identified()
    }

    fn commit_version(&self) -> Option<&Identifier> {
        self.commit_version.as_ref()
    }
}

/// Functional equality: identity, parent, descriptor, activation,
/// completion, and commit cursor. Pending change events are excluded so a
/// freshly rehydrated instance equals the live instance it was read from.
impl PartialEq for Process {
    fn eq(&self, other: &Self) -> bool {
        self.entity == other.entity
            && self.parent == other.parent
            && self.descriptor == other.descriptor
            && self.activation == other.activation
            && self.completion == other.completion
            && self.commit_version == other.commit_version
    }
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "process '{}' ({})",
            self.name(),
            if self.is_active() { "active" } else { "inactive" }
        )
    }
}

/// Rebuilds process instances from recorded facts
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessFactory;

impl MutedAggregateFactory for ProcessFactory {
    type Aggregate = Process;

    /// Rebuild the identified process from its event history
    ///
    /// The first event must be the creation fact; any later creation fact
    /// in the history is an integrity error surfaced by `mutate_when`.
    fn instance_of(&self, id: &Identifier, events: &[ProcessEvent]) -> DomainResult<Process> {
        let mut iter = events.iter();
        let first = iter.next().ok_or_else(|| DomainError::missing("events"))?;

        let mut process = match first {
            ProcessEvent::Created {
                event_id,
                process_id,
                parent,
                name,
                ..
            } => {
                if process_id != id {
                    return Err(DomainError::InvalidOperation {
                        reason: format!(
                            "creation fact concerns {process_id}, not the requested {id}"
                        ),
                    });
                }
                let mut process =
                    Process::origin(parent.clone(), process_id.clone(), name)?;
                process.commit_version = Some(event_id.clone());
                process
            }
            other => {
                return Err(DomainError::InvalidOperation {
                    reason: format!(
                        "process history must start with a creation fact, found {}",
                        other.event_type()
                    ),
                });
            }
        };

        for event in iter {
            process.mutate_when(event)?;
        }
        process.change_events.clear();
        Ok(process)
    }
}
