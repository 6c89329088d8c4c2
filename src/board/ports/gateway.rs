//! Gateway port for the remote board endpoints.

use crate::board::domain::{
    ClientId, ClientRequestId, DirectoryUser, DiscussionId, DiscussionMessage, ProjectId, Task,
    TaskAssignment, TaskAttachment, TaskId, TaskPatch, TaskPriority, TaskStatus, UserId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Body of a status change request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusUpdate {
    /// Target column.
    pub status: TaskStatus,
    /// User performing the change.
    pub updated_by: UserId,
}

/// Body of a field edit request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldUpdate {
    /// Changed fields.
    pub patch: TaskPatch,
    /// Client time of the edit.
    pub updated_at: DateTime<Utc>,
}

/// Combined task and message creation payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskWithMessage {
    /// Deduplication key for retries.
    pub request_id: ClientRequestId,
    /// Discussion receiving the message.
    pub discussion_id: DiscussionId,
    /// Author of the message and creator of the task.
    pub sender_id: UserId,
    /// Message content; mirrors the task title.
    pub content: String,
    /// Task title.
    pub title: String,
    /// Task description.
    pub description: String,
    /// Initial column.
    pub status: TaskStatus,
    /// Initial priority.
    pub priority: TaskPriority,
    /// Optional due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Optional estimated-time label.
    pub estimated_time: Option<String>,
    /// Assignees, all drawn from the user directory.
    pub assigned_user_ids: BTreeSet<UserId>,
    /// Client correlation.
    pub client_id: Option<ClientId>,
    /// Project correlation.
    pub project_id: Option<ProjectId>,
    /// Optional attachment descriptor.
    pub attachment: Option<TaskAttachment>,
}

/// Combined projection returned by the creation endpoint.
///
/// Either half may be missing from a misbehaving server; callers must check
/// both before using the reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreationReply {
    /// The created task.
    pub task: Option<Task>,
    /// The task-typed message announcing it.
    pub message: Option<DiscussionMessage>,
}

/// Remote board persistence contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BoardGateway: Send + Sync {
    /// Loads every task of a discussion.
    async fn load_board(&self, discussion_id: DiscussionId) -> GatewayResult<Vec<Task>>;

    /// Persists a status change.
    ///
    /// Returns the updated task when the server echoes it, `None` on an
    /// empty success response.
    async fn update_status(
        &self,
        task_id: TaskId,
        update: StatusUpdate,
    ) -> GatewayResult<Option<Task>>;

    /// Persists a partial field edit and returns the updated task.
    async fn update_fields(&self, task_id: TaskId, update: FieldUpdate) -> GatewayResult<Task>;

    /// Lists all task assignments.
    async fn list_assignments(&self) -> GatewayResult<Vec<TaskAssignment>>;

    /// Creates a task and its task-typed message in one server operation.
    async fn create_task_with_message(
        &self,
        request: CreateTaskWithMessage,
    ) -> GatewayResult<CreationReply>;

    /// Lists the user directory.
    async fn list_users(&self) -> GatewayResult<Vec<DirectoryUser>>;

    /// Lists a discussion's messages in chronological order.
    async fn list_messages(
        &self,
        discussion_id: DiscussionId,
    ) -> GatewayResult<Vec<DiscussionMessage>>;
}

/// Errors returned by gateway implementations. Every variant is a network
/// failure from the board's point of view.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// The request could not be sent or the connection failed.
    #[error("transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),

    /// The server answered with a non-success status.
    #[error("server responded with status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// The response body could not be decoded.
    #[error("malformed response: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
