//! Discussion messages, including the task-typed variant.

use super::{DiscussionId, MessageId, Task, TaskId, TaskPriority, TaskStatus, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Denormalized copy of the task fields a task-typed message renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    /// Correlated task.
    pub task_id: TaskId,
    /// Task title.
    pub title: String,
    /// Task status.
    pub status: TaskStatus,
    /// Task priority.
    pub priority: TaskPriority,
    /// Task due date.
    pub due_date: Option<DateTime<Utc>>,
}

impl TaskSnapshot {
    /// Captures the renderable fields of `task`.
    #[must_use]
    pub fn of(task: &Task) -> Self {
        Self {
            task_id: task.id(),
            title: task.title().to_owned(),
            status: task.status(),
            priority: task.priority(),
            due_date: task.due_date(),
        }
    }
}

/// Message body variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    /// Ordinary chat text.
    Text,
    /// Message announcing a task, with its snapshot.
    Task(TaskSnapshot),
}

/// A chat message within a discussion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscussionMessage {
    id: MessageId,
    discussion_id: DiscussionId,
    sender_id: UserId,
    content: String,
    body: MessageBody,
    sent_at: DateTime<Utc>,
    edited: bool,
}

/// Parameter object for reconstructing a message from a server projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageData {
    /// Server identifier.
    pub id: MessageId,
    /// Owning discussion.
    pub discussion_id: DiscussionId,
    /// Author.
    pub sender_id: UserId,
    /// Text content. For task messages this mirrors the task title at creation.
    pub content: String,
    /// Text or task body.
    pub body: MessageBody,
    /// Server timestamp.
    pub sent_at: DateTime<Utc>,
    /// Whether the message was edited after sending.
    pub edited: bool,
}

impl DiscussionMessage {
    /// Reconstructs a message from a server projection.
    #[must_use]
    pub fn from_data(data: MessageData) -> Self {
        Self {
            id: data.id,
            discussion_id: data.discussion_id,
            sender_id: data.sender_id,
            content: data.content,
            body: data.body,
            sent_at: data.sent_at,
            edited: data.edited,
        }
    }

    /// Returns the message identifier.
    #[must_use]
    pub const fn id(&self) -> MessageId {
        self.id
    }

    /// Returns the owning discussion.
    #[must_use]
    pub const fn discussion_id(&self) -> DiscussionId {
        self.discussion_id
    }

    /// Returns the author.
    #[must_use]
    pub const fn sender_id(&self) -> UserId {
        self.sender_id
    }

    /// Returns the text content.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the message body.
    #[must_use]
    pub const fn body(&self) -> &MessageBody {
        &self.body
    }

    /// Returns the send time.
    #[must_use]
    pub const fn sent_at(&self) -> DateTime<Utc> {
        self.sent_at
    }

    /// Returns whether the message was edited.
    #[must_use]
    pub const fn edited(&self) -> bool {
        self.edited
    }

    /// Returns the correlated task id for task-typed messages.
    #[must_use]
    pub const fn task_id(&self) -> Option<TaskId> {
        match &self.body {
            MessageBody::Task(snapshot) => Some(snapshot.task_id),
            MessageBody::Text => None,
        }
    }

    /// Returns the task snapshot for task-typed messages.
    #[must_use]
    pub const fn task_snapshot(&self) -> Option<&TaskSnapshot> {
        match &self.body {
            MessageBody::Task(snapshot) => Some(snapshot),
            MessageBody::Text => None,
        }
    }

    /// Replaces the task snapshot if this message correlates to `task`.
    ///
    /// Returns `true` when the snapshot changed.
    pub(crate) fn refresh_snapshot(&mut self, task: &Task) -> bool {
        let MessageBody::Task(snapshot) = &mut self.body else {
            return false;
        };
        if snapshot.task_id != task.id() {
            return false;
        }
        let fresh = TaskSnapshot::of(task);
        if *snapshot == fresh {
            return false;
        }
        *snapshot = fresh;
        true
    }
}
