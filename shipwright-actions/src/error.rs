//! Error types for step lookup, validation and execution

use thiserror::Error;

/// Input rejected by a step's schema
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("unknown argument {0:?}")]
    UnknownArgument(String),

    #[error("unknown option {0:?}")]
    UnknownOption(String),

    #[error("missing required argument {0:?}")]
    MissingArgument(String),

    #[error("missing required option {0:?}")]
    MissingOption(String),

    #[error("{name:?} expects a {expected} value, got {found}")]
    WrongKind {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Failure of a step invocation, labelled with the step id
#[derive(Debug, Error)]
pub enum ActionError {
    /// No step is registered under the id
    #[error("action {0:?} was not found")]
    NotFound(String),

    /// Input did not match the step's schema; the step never ran
    #[error("failed to validate input for action {id:?}")]
    Validation {
        id: String,
        #[source]
        source: ValidationError,
    },

    /// The step ran and failed
    #[error("error executing action {id:?}")]
    Execution {
        id: String,
        #[source]
        source: anyhow::Error,
    },
}

impl ActionError {
    /// Id of the step the error belongs to
    pub fn action_id(&self) -> &str {
        match self {
            ActionError::NotFound(id) => id,
            ActionError::Validation { id, .. } => id,
            ActionError::Execution { id, .. } => id,
        }
    }
}
