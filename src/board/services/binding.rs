//! Combined creation of a task and the message that announces it.

use crate::board::domain::{
    BoardDomainError, ClientId, ClientRequestId, DiscussionId, DiscussionMessage, ProjectId, Task,
    TaskAttachment, TaskPriority, TaskStatus, UserId,
};
use crate::board::error::{BoardError, BoardResult};
use crate::board::ports::{BoardGateway, CreateTaskWithMessage, CreationReply, Notice, Notifier};
use crate::board::state::{Board, BoardEvent};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{info, warn};

/// Task fields supplied by the user when creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    title: String,
    description: String,
    status: Option<TaskStatus>,
    priority: Option<TaskPriority>,
    due_date: Option<DateTime<Utc>>,
    estimated_time: Option<String>,
    assigned_user_ids: BTreeSet<UserId>,
    client_id: Option<ClientId>,
    project_id: Option<ProjectId>,
    attachment: Option<TaskAttachment>,
}

impl NewTask {
    /// Creates task data with a title; every other field takes its default.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            status: None,
            priority: None,
            due_date: None,
            estimated_time: None,
            assigned_user_ids: BTreeSet::new(),
            client_id: None,
            project_id: None,
            attachment: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Overrides the initial column (`ToDo` by default).
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Overrides the priority (`Medium` by default).
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sets the estimated-time label.
    #[must_use]
    pub fn with_estimated_time(mut self, estimated_time: impl Into<String>) -> Self {
        self.estimated_time = Some(estimated_time.into());
        self
    }

    /// Sets the assignees.
    #[must_use]
    pub fn with_assignees(mut self, assignees: impl IntoIterator<Item = UserId>) -> Self {
        self.assigned_user_ids = assignees.into_iter().collect();
        self
    }

    /// Sets the client and project correlation.
    #[must_use]
    pub const fn with_correlation(
        mut self,
        client_id: Option<ClientId>,
        project_id: Option<ProjectId>,
    ) -> Self {
        self.client_id = client_id;
        self.project_id = project_id;
        self
    }

    /// Attaches a file or voice recording descriptor.
    #[must_use]
    pub fn with_attachment(mut self, attachment: TaskAttachment) -> Self {
        self.attachment = Some(attachment);
        self
    }
}

/// A task together with the task-typed message announcing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedTaskWithMessage {
    /// The created task.
    pub task: Task,
    /// Its message.
    pub message: DiscussionMessage,
}

/// Creates tasks through their discussion and keeps the pair consistent.
pub struct TaskMessageBinding<G, N>
where
    G: BoardGateway,
    N: Notifier,
{
    board: Board,
    gateway: Arc<G>,
    notifier: Arc<N>,
}

impl<G, N> TaskMessageBinding<G, N>
where
    G: BoardGateway,
    N: Notifier,
{
    /// Creates a binding over a shared board.
    #[must_use]
    pub const fn new(board: Board, gateway: Arc<G>, notifier: Arc<N>) -> Self {
        Self {
            board,
            gateway,
            notifier,
        }
    }

    /// Reloads the cached user directory.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::NetworkFailure`] when the listing fails; the
    /// previous cache is kept.
    pub async fn refresh_users(&self) -> BoardResult<usize> {
        let users = self.gateway.list_users().await?;
        let count = users.len();
        self.board.write(|state| state.users_mut().replace(users))?;
        Ok(count)
    }

    /// Creates a task and its task-typed message as one operation.
    ///
    /// Nothing is inserted unless the server returns both halves and they
    /// correlate. On success the task lands at the end of its column and the
    /// message at its chronological place in the discussion.
    ///
    /// # Errors
    ///
    /// - [`BoardError::Domain`] for a blank title or an assignee missing from
    ///   the user directory
    /// - [`BoardError::NetworkFailure`] when a remote call fails
    /// - [`BoardError::IncompleteCreation`] when the reply lacks the task or
    ///   the message, or they do not match
    pub async fn create_task_with_message(
        &self,
        discussion_id: DiscussionId,
        new_task: NewTask,
        sender_id: UserId,
    ) -> BoardResult<CreatedTaskWithMessage> {
        let title = new_task.title.trim().to_owned();
        if title.is_empty() {
            return Err(BoardDomainError::EmptyTitle.into());
        }
        if !self.board.read(|state| state.users().is_loaded())? {
            self.refresh_users().await?;
        }
        let unknown = self.board.read(|state| {
            state
                .users()
                .first_unknown(&new_task.assigned_user_ids)
        })?;
        if let Some(user_id) = unknown {
            warn!(discussion_id = %discussion_id, user_id = %user_id, "task creation rejected: unknown assignee");
            return Err(BoardDomainError::UnknownAssignee(user_id).into());
        }

        let request = CreateTaskWithMessage {
            request_id: ClientRequestId::new(),
            discussion_id,
            sender_id,
            content: title.clone(),
            title,
            description: new_task.description,
            status: new_task.status.unwrap_or_default(),
            priority: new_task.priority.unwrap_or_default(),
            due_date: new_task.due_date,
            estimated_time: new_task.estimated_time,
            assigned_user_ids: new_task.assigned_user_ids,
            client_id: new_task.client_id,
            project_id: new_task.project_id,
            attachment: new_task.attachment,
        };
        let request_id = request.request_id;

        let reply = match self.gateway.create_task_with_message(request).await {
            Ok(reply) => reply,
            Err(err) => {
                warn!(discussion_id = %discussion_id, request_id = %request_id, error = %err, "task creation failed");
                self.notifier
                    .notify(Notice::failure("The task could not be created."));
                return Err(err.into());
            }
        };
        let created = correlate(discussion_id, reply).inspect_err(|err| {
            warn!(discussion_id = %discussion_id, request_id = %request_id, error = %err, "task creation reply rejected");
        })?;

        let task_id = created.task.id();
        let message_id = created.message.id();
        self.board.write(|state| {
            state.commit_task_with_message(created.task.clone(), created.message.clone());
        })?;
        self.board.emit(BoardEvent::TaskCreated {
            task_id,
            message_id,
        });
        info!(discussion_id = %discussion_id, task_id = %task_id, message_id = %message_id, "task created with message");
        Ok(created)
    }
}

/// Checks that a creation reply holds one task and one message that belong
/// together.
fn correlate(
    discussion_id: DiscussionId,
    reply: CreationReply,
) -> BoardResult<CreatedTaskWithMessage> {
    let (task, message) = match (reply.task, reply.message) {
        (Some(task), Some(message)) => (task, message),
        (None, Some(_)) => {
            return Err(BoardError::IncompleteCreation(
                "reply carries a message but no task".to_owned(),
            ));
        }
        (Some(_), None) => {
            return Err(BoardError::IncompleteCreation(
                "reply carries a task but no message".to_owned(),
            ));
        }
        (None, None) => {
            return Err(BoardError::IncompleteCreation(
                "reply carries neither task nor message".to_owned(),
            ));
        }
    };
    if message.task_id() != Some(task.id()) {
        return Err(BoardError::IncompleteCreation(format!(
            "message {} does not reference task {}",
            message.id(),
            task.id()
        )));
    }
    if task.discussion_id() != discussion_id || message.discussion_id() != discussion_id {
        return Err(BoardError::IncompleteCreation(format!(
            "reply belongs to another discussion than {discussion_id}"
        )));
    }
    Ok(CreatedTaskWithMessage { task, message })
}
