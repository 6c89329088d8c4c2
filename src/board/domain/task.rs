//! Task aggregate and its editable fields.

use super::{BoardDomainError, ClientId, DiscussionId, ProjectId, TaskId, TaskPriority, TaskStatus, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Optional attachment carried by a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TaskAttachment {
    /// Uploaded file reference.
    File {
        /// Location returned by the upload collaborator.
        url: String,
        /// Original file name.
        name: String,
    },
    /// Recorded voice note reference.
    #[serde(rename_all = "camelCase")]
    Voice {
        /// Location returned by the upload collaborator.
        url: String,
        /// Recording length in seconds.
        duration_seconds: u32,
    },
}

impl TaskAttachment {
    /// Creates a voice attachment.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::InvalidVoiceDuration`] when the duration
    /// is zero.
    pub fn voice(url: impl Into<String>, duration_seconds: u32) -> Result<Self, BoardDomainError> {
        if duration_seconds == 0 {
            return Err(BoardDomainError::InvalidVoiceDuration);
        }
        Ok(Self::Voice {
            url: url.into(),
            duration_seconds,
        })
    }

    /// Creates a file attachment.
    #[must_use]
    pub fn file(url: impl Into<String>, name: impl Into<String>) -> Self {
        Self::File {
            url: url.into(),
            name: name.into(),
        }
    }
}

/// Parameter object for reconstructing a task from a server projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskData {
    /// Server identifier.
    pub id: TaskId,
    /// Short title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Current column.
    pub status: TaskStatus,
    /// Priority level.
    pub priority: TaskPriority,
    /// Optional due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Optional estimated-time label, free text.
    pub estimated_time: Option<String>,
    /// Server-side ordering hint within the column.
    pub sort_order: i32,
    /// User who created the task.
    pub created_by: UserId,
    /// Users assigned to the task.
    pub assigned_user_ids: BTreeSet<UserId>,
    /// Owning discussion.
    pub discussion_id: DiscussionId,
    /// Client correlation, if any.
    pub client_id: Option<ClientId>,
    /// Project correlation, if any.
    pub project_id: Option<ProjectId>,
    /// Optional attachment.
    pub attachment: Option<TaskAttachment>,
    /// Last server-side modification time, when the server reports one.
    pub updated_at: Option<DateTime<Utc>>,
}

impl TaskData {
    /// Creates task data with required fields and defaults for the rest.
    #[must_use]
    pub fn new(
        id: TaskId,
        title: impl Into<String>,
        created_by: UserId,
        discussion_id: DiscussionId,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            status: TaskStatus::default(),
            priority: TaskPriority::default(),
            due_date: None,
            estimated_time: None,
            sort_order: 0,
            created_by,
            assigned_user_ids: BTreeSet::new(),
            discussion_id,
            client_id: None,
            project_id: None,
            attachment: None,
            updated_at: None,
        }
    }

    /// Sets the status column.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the assignees.
    #[must_use]
    pub fn with_assignees(mut self, assignees: impl IntoIterator<Item = UserId>) -> Self {
        self.assigned_user_ids = assignees.into_iter().collect();
        self
    }

    /// Sets the sort order hint.
    #[must_use]
    pub const fn with_sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = sort_order;
        self
    }

    /// Sets the server modification time.
    #[must_use]
    pub const fn with_updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = Some(updated_at);
        self
    }
}

/// Task aggregate.
///
/// Status changes go through the board state so that column membership and
/// the status field never disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    id: TaskId,
    title: String,
    description: String,
    status: TaskStatus,
    priority: TaskPriority,
    due_date: Option<DateTime<Utc>>,
    estimated_time: Option<String>,
    sort_order: i32,
    created_by: UserId,
    assigned_user_ids: BTreeSet<UserId>,
    discussion_id: DiscussionId,
    client_id: Option<ClientId>,
    project_id: Option<ProjectId>,
    attachment: Option<TaskAttachment>,
    updated_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Reconstructs a task from a server projection.
    #[must_use]
    pub fn from_data(data: TaskData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            description: data.description,
            status: data.status,
            priority: data.priority,
            due_date: data.due_date,
            estimated_time: data.estimated_time,
            sort_order: data.sort_order,
            created_by: data.created_by,
            assigned_user_ids: data.assigned_user_ids,
            discussion_id: data.discussion_id,
            client_id: data.client_id,
            project_id: data.project_id,
            attachment: data.attachment,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the status column.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> TaskPriority {
        self.priority
    }

    /// Returns the due date, if any.
    #[must_use]
    pub const fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    /// Returns the estimated-time label, if any.
    #[must_use]
    pub fn estimated_time(&self) -> Option<&str> {
        self.estimated_time.as_deref()
    }

    /// Returns the server ordering hint.
    #[must_use]
    pub const fn sort_order(&self) -> i32 {
        self.sort_order
    }

    /// Returns the creator.
    #[must_use]
    pub const fn created_by(&self) -> UserId {
        self.created_by
    }

    /// Returns the assignees.
    #[must_use]
    pub const fn assigned_user_ids(&self) -> &BTreeSet<UserId> {
        &self.assigned_user_ids
    }

    /// Returns the owning discussion.
    #[must_use]
    pub const fn discussion_id(&self) -> DiscussionId {
        self.discussion_id
    }

    /// Returns the client correlation, if any.
    #[must_use]
    pub const fn client_id(&self) -> Option<ClientId> {
        self.client_id
    }

    /// Returns the project correlation, if any.
    #[must_use]
    pub const fn project_id(&self) -> Option<ProjectId> {
        self.project_id
    }

    /// Returns the attachment, if any.
    #[must_use]
    pub const fn attachment(&self) -> Option<&TaskAttachment> {
        self.attachment.as_ref()
    }

    /// Returns the last modification time issued by the server.
    #[must_use]
    pub const fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Returns `true` when `user` created the task or is assigned to it.
    #[must_use]
    pub fn involves(&self, user: UserId) -> bool {
        self.created_by == user || self.assigned_user_ids.contains(&user)
    }

    pub(crate) const fn set_status(&mut self, status: TaskStatus) {
        self.status = status;
    }

    /// Records the server's modification time. Local edits never call this.
    pub(crate) const fn stamp(&mut self, at: DateTime<Utc>) {
        self.updated_at = Some(at);
    }

    pub(crate) fn apply_patch(&mut self, patch: &TaskPatch) {
        if let Some(title) = &patch.title {
            self.title.clone_from(title);
        }
        if let Some(description) = &patch.description {
            self.description.clone_from(description);
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(estimated_time) = &patch.estimated_time {
            self.estimated_time.clone_from(estimated_time);
        }
    }
}

/// Partial field edit for a task. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New priority.
    pub priority: Option<TaskPriority>,
    /// New due date; `Some(None)` clears it.
    pub due_date: Option<Option<DateTime<Utc>>>,
    /// New estimated-time label; `Some(None)` clears it.
    pub estimated_time: Option<Option<String>>,
}

impl TaskPatch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the title.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::EmptyTitle`] if the title is blank.
    pub fn with_title(mut self, title: impl Into<String>) -> Result<Self, BoardDomainError> {
        let value = title.into();
        if value.trim().is_empty() {
            return Err(BoardDomainError::EmptyTitle);
        }
        self.title = Some(value);
        Ok(self)
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Sets or clears the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: Option<DateTime<Utc>>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sets or clears the estimated-time label.
    #[must_use]
    pub fn with_estimated_time(mut self, estimated_time: Option<String>) -> Self {
        self.estimated_time = Some(estimated_time);
        self
    }

    /// Returns `true` when the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
            && self.estimated_time.is_none()
    }
}
