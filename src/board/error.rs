//! Service-level error types for board operations.
//!
//! Uses `thiserror` for typed variants that callers can match on. The
//! precondition variants (`PermissionDenied`, `InvalidStatus`,
//! `MissingActor`) are raised before any network effect.

use super::domain::{BoardDomainError, ParseTaskStatusError, TaskId, UserId};
use super::ports::GatewayError;
use thiserror::Error;

/// Errors returned by board services.
#[derive(Debug, Clone, Error)]
pub enum BoardError {
    /// The acting user is neither the creator nor an assignee.
    #[error("user {user_id} may not change the status of task {task_id}")]
    PermissionDenied {
        /// Task the user tried to change.
        task_id: TaskId,
        /// User who attempted the change.
        user_id: UserId,
    },

    /// The target status is not a recognized column.
    #[error(transparent)]
    InvalidStatus(#[from] ParseTaskStatusError),

    /// No current user context was supplied.
    #[error("no acting user for this operation")]
    MissingActor,

    /// A remote call failed.
    #[error("network failure: {0}")]
    NetworkFailure(#[from] GatewayError),

    /// The task is not on the board.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// Another change to the task has not settled yet.
    #[error("a change to task {0} is still awaiting the server")]
    ChangeInFlight(TaskId),

    /// The server reply to a combined creation lacked the task or the
    /// message, or the two did not correlate.
    #[error("incomplete task creation: {0}")]
    IncompleteCreation(String),

    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] BoardDomainError),

    /// The shared board state lock was poisoned by a panic.
    #[error("board state is unavailable")]
    StatePoisoned,
}

impl BoardError {
    /// Returns `true` for failures of a remote call.
    #[must_use]
    pub const fn is_network_failure(&self) -> bool {
        matches!(self, Self::NetworkFailure(_))
    }
}

/// Result type for board service operations.
pub type BoardResult<T> = Result<T, BoardError>;
