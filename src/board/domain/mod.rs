//! Domain model for the task board.
//!
//! Tasks, their status columns and the task-typed discussion messages that
//! announce them. No infrastructure concerns live here.

mod error;
mod ids;
mod message;
mod status;
mod task;

pub use error::{BoardDomainError, ParseTaskPriorityError, ParseTaskStatusError};
pub use ids::{ClientId, ClientRequestId, DiscussionId, MessageId, ProjectId, TaskId, UserId};
pub use message::{DiscussionMessage, MessageBody, MessageData, TaskSnapshot};
pub use status::{TaskPriority, TaskStatus};
pub use task::{Task, TaskAttachment, TaskData, TaskPatch};

/// A user from the user directory collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryUser {
    /// User identifier.
    pub id: UserId,
    /// Display name.
    pub display_name: String,
}

/// One row of the task assignment listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskAssignment {
    /// Assigned task.
    pub task_id: TaskId,
    /// Assigned user.
    pub user_id: UserId,
}
