// Copyright 2025 Cowboy AI, LLC.

//! Error types for domain operations

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Clone, Error)]
pub enum DomainError {
    /// Required constructor or operation argument missing or empty
    #[error("Missing required argument: {parameter}")]
    MissingRequired {
        /// Name of the missing parameter
        parameter: String,
    },

    /// A new property version does not match its predecessor's kind
    #[error("History type mismatch: expected {expected}, found {found}")]
    HistoryTypeMismatch {
        /// Kind of the existing history chain
        expected: String,
        /// Kind of the rejected candidate version
        found: String,
    },

    /// A property claims an owner different from the expected entity
    #[error("Owner mismatch: expected {expected}, found {found}")]
    OwnerMismatch {
        /// Identifier value of the expected owner
        expected: String,
        /// Identifier value of the found owner
        found: String,
    },

    /// Invalid operation
    #[error("Invalid operation: {reason}")]
    InvalidOperation {
        /// Reason why the operation is invalid
        reason: String,
    },

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// An immutable full copy of a value could not be produced
    #[error("Immutability failure: {0}")]
    ImmutabilityFailure(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Generic domain error
    #[error("Domain error: {0}")]
    Generic(String),
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}

impl DomainError {
    /// Create a generic domain error
    pub fn generic(msg: impl Into<String>) -> Self {
        DomainError::Generic(msg.into())
    }

    /// Create a missing-required-argument error
    pub fn missing(parameter: impl Into<String>) -> Self {
        DomainError::MissingRequired {
            parameter: parameter.into(),
        }
    }

    /// Check if this is a caller error (bad argument, failed conformity)
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            DomainError::MissingRequired { .. }
                | DomainError::HistoryTypeMismatch { .. }
                | DomainError::OwnerMismatch { .. }
                | DomainError::InvalidOperation { .. }
                | DomainError::ValidationError(_)
        )
    }

    /// Check if this is a non-retriable defect rather than a caller error
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DomainError::ImmutabilityFailure(_) | DomainError::SerializationError(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test error creation and display messages
    ///
    /// ```mermaid
    /// graph TD
    ///     A[DomainError] -->|Display| B[Error Message]
    ///     A -->|Clone| C[Cloned Error]
    ///     A -->|Debug| D[Debug Format]
    /// ```
    #[test]
    fn test_error_display_messages() {
        let err = DomainError::MissingRequired {
            parameter: "owner".to_string(),
        };
        assert_eq!(err.to_string(), "Missing required argument: owner");

        let err = DomainError::HistoryTypeMismatch {
            expected: "completion-state".to_string(),
            found: "activity-state".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "History type mismatch: expected completion-state, found activity-state"
        );

        let err = DomainError::OwnerMismatch {
            expected: "tenant-1".to_string(),
            found: "tenant-2".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Owner mismatch: expected tenant-1, found tenant-2"
        );

        let err = DomainError::InvalidOperation {
            reason: "Aggregate is already created".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid operation: Aggregate is already created"
        );

        let err = DomainError::ValidationError("Percentage cannot be negative".to_string());
        assert_eq!(
            err.to_string(),
            "Validation error: Percentage cannot be negative"
        );

        let err = DomainError::ImmutabilityFailure("State is not serializable".to_string());
        assert_eq!(
            err.to_string(),
            "Immutability failure: State is not serializable"
        );

        let err = DomainError::SerializationError("Invalid JSON".to_string());
        assert_eq!(err.to_string(), "Serialization error: Invalid JSON");

        let err = DomainError::Generic("Something went wrong".to_string());
        assert_eq!(err.to_string(), "Domain error: Something went wrong");
    }

    /// Test generic and missing constructors
    #[test]
    fn test_constructors() {
        let err = DomainError::generic("Test message");
        assert_eq!(err.to_string(), "Domain error: Test message");

        let err = DomainError::missing("propertyCurrentValue");
        assert_eq!(
            err.to_string(),
            "Missing required argument: propertyCurrentValue"
        );
        assert!(err.is_invalid_argument());
    }

    /// Test is_invalid_argument helper
    ///
    /// ```mermaid
    /// graph TD
    ///     A[MissingRequired] -->|is_invalid_argument| B[true]
    ///     C[HistoryTypeMismatch] -->|is_invalid_argument| D[true]
    ///     E[OwnerMismatch] -->|is_invalid_argument| F[true]
    ///     G[ImmutabilityFailure] -->|is_invalid_argument| H[false]
    /// ```
    #[test]
    fn test_is_invalid_argument() {
        assert!(DomainError::MissingRequired {
            parameter: "owner".to_string(),
        }
        .is_invalid_argument());
        assert!(DomainError::HistoryTypeMismatch {
            expected: "a".to_string(),
            found: "b".to_string(),
        }
        .is_invalid_argument());
        assert!(DomainError::OwnerMismatch {
            expected: "a".to_string(),
            found: "b".to_string(),
        }
        .is_invalid_argument());
        assert!(DomainError::ValidationError("Test".to_string()).is_invalid_argument());
        assert!(DomainError::InvalidOperation {
            reason: "Test".to_string(),
        }
        .is_invalid_argument());

        assert!(!DomainError::ImmutabilityFailure("Test".to_string()).is_invalid_argument());
        assert!(!DomainError::Generic("Test".to_string()).is_invalid_argument());
    }

    /// Test is_fatal helper
    #[test]
    fn test_is_fatal() {
        assert!(DomainError::ImmutabilityFailure("Test".to_string()).is_fatal());
        assert!(DomainError::SerializationError("Test".to_string()).is_fatal());

        assert!(!DomainError::ValidationError("Test".to_string()).is_fatal());
        assert!(!DomainError::Generic("Test".to_string()).is_fatal());
    }

    /// Test DomainResult type alias
    #[test]
    fn test_domain_result() {
        let success: DomainResult<i32> = Ok(42);
        assert!(success.is_ok());
        assert_eq!(success.ok().unwrap(), 42);

        let error: DomainResult<i32> = Err(DomainError::Generic("Failed".to_string()));
        assert!(error.is_err());
        assert_eq!(error.err().unwrap().to_string(), "Domain error: Failed");
    }

    /// Test error chaining with map_err
    #[test]
    fn test_error_chaining() {
        fn inner_operation() -> Result<i32, String> {
            Err("Inner error".to_string())
        }

        fn outer_operation() -> DomainResult<i32> {
            inner_operation().map_err(DomainError::ImmutabilityFailure)
        }

        let result = outer_operation();
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "Immutability failure: Inner error"
        );
    }

    /// Test serde_json error conversion
    #[test]
    fn test_serde_json_conversion() {
        let invalid_json = "{ invalid json }";
        let serde_err = serde_json::from_str::<serde_json::Value>(invalid_json).unwrap_err();

        let domain_err: DomainError = serde_err.into();

        match domain_err {
            DomainError::SerializationError(msg) => {
                assert!(!msg.is_empty());
            }
            _ => panic!("Expected SerializationError"),
        }
    }

    /// Test all error variants can be cloned
    #[test]
    fn test_all_errors_clone() {
        let errors: Vec<DomainError> = vec![
            DomainError::MissingRequired {
                parameter: "owner".to_string(),
            },
            DomainError::HistoryTypeMismatch {
                expected: "a".to_string(),
                found: "b".to_string(),
            },
            DomainError::OwnerMismatch {
                expected: "a".to_string(),
                found: "b".to_string(),
            },
            DomainError::InvalidOperation {
                reason: "test".to_string(),
            },
            DomainError::ValidationError("test".to_string()),
            DomainError::ImmutabilityFailure("test".to_string()),
            DomainError::SerializationError("test".to_string()),
            DomainError::Generic("test".to_string()),
        ];

        for error in errors {
            let cloned = error.clone();
            assert_eq!(error.to_string(), cloned.to_string());
        }
    }
}
