//! Error types for the converge reconciliation engine.
//!
//! This module provides the error hierarchy for the engine: handler
//! registration and option errors, selector parsing errors, and the
//! synchronous failure channel used by change handlers.
//!
//! Per-change operational failures are deliberately *not* represented here;
//! they travel as [`crate::change::ChangeError`] values inside a `FAILED`
//! [`crate::change::ChangeResult`] and never abort sibling changes.

use thiserror::Error;

use crate::change::Operation;

/// The main error type for the converge engine.
#[derive(Debug, Error)]
pub enum ConvergeError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Selector expression errors.
    #[error("Selector error: {0}")]
    Selector(#[from] SelectorError),

    /// Handler dispatch errors.
    #[error("Handler error: {0}")]
    Handler(#[from] HandlerError),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Configuration-related errors.
///
/// These are fatal and surface before any side effect runs.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Two handlers both claim the same operation.
    #[error("Duplicate handler registered for operation '{operation}'")]
    DuplicateHandler {
        /// The operation claimed more than once.
        operation: Operation,
    },

    /// A context option holds a value of the wrong type.
    #[error("Invalid value for option '{key}': {message}")]
    InvalidOption {
        /// The offending option key.
        key: String,
        /// Description of the type mismatch.
        message: String,
    },
}

/// Selector expression errors.
///
/// Malformed expressions fail fast, before reconciliation starts.
#[derive(Debug, Error)]
pub enum SelectorError {
    /// The expression does not match the `<key> <operator> (<values>)` grammar.
    #[error("Malformed selector expression: '{expression}'")]
    MalformedExpression {
        /// The expression that failed to parse.
        expression: String,
    },

    /// The operator token is not part of the grammar.
    #[error("Unknown selector operator: '{operator}'")]
    UnknownOperator {
        /// The unrecognized operator token.
        operator: String,
    },

    /// A MATCHES/DOESNOTMATCH pattern failed to compile.
    #[error("Invalid regular expression '{pattern}': {message}")]
    InvalidPattern {
        /// The pattern that failed to compile.
        pattern: String,
        /// Compiler error message.
        message: String,
    },

    /// The operator requires at least one value but none were given.
    #[error("Operator '{operator}' requires at least one value")]
    MissingValues {
        /// The operator missing its values.
        operator: String,
    },

    /// The operator takes no values but some were given.
    #[error("Operator '{operator}' does not take values")]
    UnexpectedValues {
        /// The operator that received values.
        operator: String,
    },
}

/// Handler dispatch errors.
///
/// Returned synchronously from a handler's `handle` call; the executor does
/// not catch them, so they abort the whole batch.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The handler could not reach its backend.
    #[error("Failed to connect to backend: {message}")]
    ConnectionFailed {
        /// Description of the connection failure.
        message: String,
    },

    /// The backend rejected the batch outright.
    #[error("Backend rejected batch: {message}")]
    BatchRejected {
        /// Description of the rejection.
        message: String,
    },
}

/// Result type alias for converge operations.
pub type Result<T> = std::result::Result<T, ConvergeError>;

impl ConvergeError {
    /// Creates a new internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl ConfigError {
    /// Creates an invalid-option error for a specific key.
    #[must_use]
    pub fn invalid_option(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidOption {
            key: key.into(),
            message: message.into(),
        }
    }
}

impl HandlerError {
    /// Creates a connection failure with the given message.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::ConnectionFailed {
            message: message.into(),
        }
    }

    /// Creates a batch rejection with the given message.
    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::BatchRejected {
            message: message.into(),
        }
    }
}
