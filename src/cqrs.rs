// Copyright 2025 Cowboy AI, LLC.

//! # CQRS (Command Query Responsibility Segregation) Pattern
//!
//! Commands request state changes and are answered with acknowledgments
//! only; results travel as domain events. Queries read without modifying
//! state. Read models are event subscribers kept current by the publisher.

use crate::identifiers::Identifier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// A command that requests a state change
///
/// Commands are write operations named with imperative verbs (CreateOrder,
/// RenameProcess). They do NOT return results directly - results come
/// through event streams.
pub trait Command: Debug + Send + Sync {
    /// Unique identifier of this command message
    fn command_id(&self) -> &Identifier;

    /// Identifier of the aggregate this command targets
    ///
    /// `None` when the command creates its target.
    fn subject_id(&self) -> Option<&Identifier>;

    /// When the command was issued
    fn occurred_at(&self) -> DateTime<Utc>;
}

/// A query that requests data without modifying state
///
/// Queries are read operations named for what they return (GetOrderById,
/// FindActiveProcesses).
pub trait Query: Debug + Send + Sync {
    /// Unique identifier of this query message
    fn query_id(&self) -> &Identifier;

    /// When the query was issued
    fn occurred_at(&self) -> DateTime<Utc>;
}

/// Status of command acceptance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandStatus {
    /// Command was accepted for processing
    Accepted,
    /// Command was rejected (e.g., validation failed)
    Rejected,
}

/// Status of query acceptance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryStatus {
    /// Query was accepted for processing
    Accepted,
    /// Query was rejected (e.g., invalid parameters)
    Rejected,
}

/// Acknowledgment returned when a command is submitted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandAcknowledgment {
    /// The command ID that was acknowledged
    pub command_id: Identifier,
    /// Status of command acceptance
    pub status: CommandStatus,
    /// Optional rejection reason
    pub reason: Option<String>,
}

impl CommandAcknowledgment {
    /// Acknowledge acceptance of the identified command
    pub fn accepted(command_id: Identifier) -> Self {
        Self {
            command_id,
            status: CommandStatus::Accepted,
            reason: None,
        }
    }

    /// Acknowledge rejection of the identified command
    pub fn rejected(command_id: Identifier, reason: impl Into<String>) -> Self {
        Self {
            command_id,
            status: CommandStatus::Rejected,
            reason: Some(reason.into()),
        }
    }
}

/// Acknowledgment returned when a query is submitted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryAcknowledgment {
    /// The query ID that was acknowledged
    pub query_id: Identifier,
    /// Status of query acceptance
    pub status: QueryStatus,
    /// Optional rejection reason
    pub reason: Option<String>,
}

/// Query response returned by query handlers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    /// The query ID that was processed
    pub query_id: Identifier,
    /// The result data
    pub result: serde_json::Value,
}

/// Handler for processing commands
///
/// Handlers return only acknowledgments. Results are published to event
/// streams.
pub trait CommandHandler<C: Command> {
    /// Handle the command and return acknowledgment
    fn handle(&mut self, command: C) -> CommandAcknowledgment;
}

/// Handler for processing queries
///
/// Handlers return query responses with the result data.
pub trait QueryHandler<Q: Query> {
    /// Handle the query and return response
    fn handle(&self, query: Q) -> QueryResponse;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct RenameSomething {
        command_id: Identifier,
        subject_id: Identifier,
        occurred_at: DateTime<Utc>,
    }

    impl Command for RenameSomething {
        fn command_id(&self) -> &Identifier {
            &self.command_id
        }

        fn subject_id(&self) -> Option<&Identifier> {
            Some(&self.subject_id)
        }

        fn occurred_at(&self) -> DateTime<Utc> {
            self.occurred_at
        }
    }

    /// Test acknowledgment construction correlates to the command
    #[test]
    fn test_command_acknowledgment() {
        let command = RenameSomething {
            command_id: Identifier::generate(None),
            subject_id: Identifier::new("uid", "p-1").unwrap(),
            occurred_at: Utc::now(),
        };

        let ack = CommandAcknowledgment::accepted(command.command_id().clone());
        assert_eq!(ack.command_id, command.command_id);
        assert_eq!(ack.status, CommandStatus::Accepted);
        assert!(ack.reason.is_none());

        let rejected =
            CommandAcknowledgment::rejected(command.command_id.clone(), "Validation failed");
        assert_eq!(rejected.status, CommandStatus::Rejected);
        assert_eq!(rejected.reason, Some("Validation failed".to_string()));
    }

    /// Test query acknowledgment correlates to the query
    #[test]
    fn test_query_acknowledgment() {
        let query_id = Identifier::generate(None);
        let ack = QueryAcknowledgment {
            query_id: query_id.clone(),
            status: QueryStatus::Accepted,
            reason: None,
        };
        assert_eq!(ack.query_id, query_id);
        assert_eq!(ack.status, QueryStatus::Accepted);
        assert!(ack.reason.is_none());
    }

    /// Test a command handler implementation over the trait
    struct CountingHandler {
        accepted_count: std::cell::RefCell<usize>,
    }

    impl CommandHandler<RenameSomething> for CountingHandler {
        fn handle(&mut self, command: RenameSomething) -> CommandAcknowledgment {
            *self.accepted_count.borrow_mut() += 1;
            CommandAcknowledgment::accepted(command.command_id)
        }
    }

    #[test]
    fn test_command_handler() {
        let mut handler = CountingHandler {
            accepted_count: std::cell::RefCell::new(0),
        };

        let command = RenameSomething {
            command_id: Identifier::generate(None),
            subject_id: Identifier::new("uid", "p-1").unwrap(),
            occurred_at: Utc::now(),
        };
        let command_id = command.command_id.clone();

        let ack = handler.handle(command);

        assert_eq!(ack.command_id, command_id);
        assert_eq!(ack.status, CommandStatus::Accepted);
        assert_eq!(*handler.accepted_count.borrow(), 1);
    }
}
