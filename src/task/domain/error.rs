//! Error types for task domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The owner key is empty after trimming.
    #[error("owner identifier must not be empty")]
    EmptyOwnerKey,

    /// The owner key has leading or trailing whitespace.
    #[error("owner identifier '{0}' must not have surrounding whitespace")]
    PaddedOwnerKey(String),

    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The status value is not a known task status.
    #[error(transparent)]
    InvalidStatus(#[from] ParseTaskStatusError),

    /// The priority value is not a known task priority.
    #[error(transparent)]
    InvalidPriority(#[from] ParseTaskPriorityError),

    /// The due date does not follow `YYYY-MM-DD`.
    #[error("invalid due date '{0}', expected YYYY-MM-DD")]
    InvalidDueDate(String),
}

/// Error returned while parsing task statuses from input or persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing task priorities from input or persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task priority: {0}")]
pub struct ParseTaskPriorityError(pub String);
