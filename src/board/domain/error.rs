//! Error types for board domain validation and parsing.

use super::UserId;
use thiserror::Error;

/// Errors returned while constructing domain board values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BoardDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// An assignee is not present in the user directory.
    #[error("user {0} is not in the user directory")]
    UnknownAssignee(UserId),

    /// A voice attachment was declared without a positive duration.
    #[error("voice attachment duration must be positive")]
    InvalidVoiceDuration,
}

/// Error returned while parsing a task status.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing a task priority.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task priority: {0}")]
pub struct ParseTaskPriorityError(pub String);
