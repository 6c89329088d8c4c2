//! JSON shapes of the board REST endpoints.
//!
//! Field names are camelCase. Statuses travel as their string tag; a numeric
//! or unknown status is a decode error, never a default.

use crate::board::domain::{
    ClientId, ClientRequestId, DirectoryUser, DiscussionId, DiscussionMessage, MessageBody,
    MessageData, MessageId, ProjectId, Task, TaskAssignment, TaskAttachment, TaskData, TaskId,
    TaskPatch, TaskPriority, TaskSnapshot, TaskStatus, UserId,
};
use crate::board::ports::{CreateTaskWithMessage, CreationReply, FieldUpdate, GatewayError, GatewayResult, StatusUpdate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

const TASK_MESSAGE_TYPE: &str = "Task";

fn parse_status(raw: &str) -> GatewayResult<TaskStatus> {
    TaskStatus::try_from(raw).map_err(|err| GatewayError::Decode(err.to_string()))
}

fn parse_priority(raw: &str) -> GatewayResult<TaskPriority> {
    TaskPriority::try_from(raw).map_err(|err| GatewayError::Decode(err.to_string()))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct TaskDto {
    id: TaskId,
    title: String,
    #[serde(default)]
    description: Option<String>,
    status: String,
    priority: String,
    #[serde(default)]
    due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    estimated_time: Option<String>,
    #[serde(default)]
    sort_order: i32,
    created_by_user_id: UserId,
    #[serde(default)]
    assigned_user_ids: Vec<UserId>,
    discussion_id: DiscussionId,
    #[serde(default)]
    client_id: Option<ClientId>,
    #[serde(default)]
    project_id: Option<ProjectId>,
    #[serde(default)]
    attachment: Option<serde_json::Value>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

/// Decodes an attachment, dropping one of an unknown kind so the task
/// itself still loads.
fn parse_attachment(task_id: TaskId, raw: serde_json::Value) -> Option<TaskAttachment> {
    serde_json::from_value(raw)
        .inspect_err(|err| warn!(task_id = %task_id, error = %err, "ignoring unreadable attachment"))
        .ok()
}

impl TaskDto {
    pub(super) fn into_task(self) -> GatewayResult<Task> {
        let mut data = TaskData::new(self.id, self.title, self.created_by_user_id, self.discussion_id)
            .with_status(parse_status(&self.status)?)
            .with_priority(parse_priority(&self.priority)?)
            .with_sort_order(self.sort_order)
            .with_assignees(self.assigned_user_ids);
        data.description = self.description.unwrap_or_default();
        data.due_date = self.due_date;
        data.estimated_time = self.estimated_time;
        data.client_id = self.client_id;
        data.project_id = self.project_id;
        data.attachment = self.attachment.and_then(|raw| parse_attachment(self.id, raw));
        data.updated_at = self.updated_at;
        Ok(Task::from_data(data))
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct BoardDto {
    #[serde(default)]
    tasks: Vec<TaskDto>,
}

impl BoardDto {
    pub(super) fn into_tasks(self) -> GatewayResult<Vec<Task>> {
        self.tasks.into_iter().map(TaskDto::into_task).collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct MessageDto {
    id: MessageId,
    discussion_id: DiscussionId,
    sender_id: UserId,
    #[serde(default)]
    content: String,
    #[serde(default)]
    message_type: Option<String>,
    sent_at: DateTime<Utc>,
    #[serde(default)]
    edited: bool,
    #[serde(default)]
    task_id: Option<TaskId>,
    #[serde(default)]
    task_title: Option<String>,
    #[serde(default)]
    task_status: Option<String>,
    #[serde(default)]
    task_priority: Option<String>,
    #[serde(default)]
    task_due_date: Option<DateTime<Utc>>,
}

impl MessageDto {
    pub(super) fn into_message(self) -> GatewayResult<DiscussionMessage> {
        let is_task = self
            .message_type
            .as_deref()
            .is_some_and(|kind| kind.eq_ignore_ascii_case(TASK_MESSAGE_TYPE));
        let body = if is_task {
            MessageBody::Task(self.snapshot()?)
        } else {
            MessageBody::Text
        };
        Ok(DiscussionMessage::from_data(MessageData {
            id: self.id,
            discussion_id: self.discussion_id,
            sender_id: self.sender_id,
            content: self.content,
            body,
            sent_at: self.sent_at,
            edited: self.edited,
        }))
    }

    fn snapshot(&self) -> GatewayResult<TaskSnapshot> {
        let missing = |field: &str| {
            GatewayError::Decode(format!("task message {} has no {field}", self.id))
        };
        let task_id = self.task_id.ok_or_else(|| missing("taskId"))?;
        let status = self.task_status.as_deref().ok_or_else(|| missing("taskStatus"))?;
        let priority = self
            .task_priority
            .as_deref()
            .ok_or_else(|| missing("taskPriority"))?;
        Ok(TaskSnapshot {
            task_id,
            title: self.task_title.clone().unwrap_or_else(|| self.content.clone()),
            status: parse_status(status)?,
            priority: parse_priority(priority)?,
            due_date: self.task_due_date,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AssignmentDto {
    task_id: TaskId,
    user_id: UserId,
}

impl From<AssignmentDto> for TaskAssignment {
    fn from(dto: AssignmentDto) -> Self {
        Self {
            task_id: dto.task_id,
            user_id: dto.user_id,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UserDto {
    id: UserId,
    #[serde(alias = "name", default)]
    display_name: String,
}

impl From<UserDto> for DirectoryUser {
    fn from(dto: UserDto) -> Self {
        Self {
            id: dto.id,
            display_name: dto.display_name,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct StatusUpdateBody {
    status: &'static str,
    updated_by_user_id: UserId,
}

impl From<StatusUpdate> for StatusUpdateBody {
    fn from(update: StatusUpdate) -> Self {
        Self {
            status: update.status.as_str(),
            updated_by_user_id: update.updated_by,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct FieldUpdateBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    priority: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    due_date: Option<Option<DateTime<Utc>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    estimated_time: Option<Option<String>>,
    updated_at: DateTime<Utc>,
}

impl From<FieldUpdate> for FieldUpdateBody {
    fn from(update: FieldUpdate) -> Self {
        let TaskPatch {
            title,
            description,
            priority,
            due_date,
            estimated_time,
        } = update.patch;
        Self {
            title,
            description,
            priority: priority.map(TaskPriority::as_str),
            due_date,
            estimated_time,
            updated_at: update.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NewMessageBody {
    content: String,
    message_type: &'static str,
    sender_id: UserId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NewTaskBody {
    title: String,
    description: String,
    status: &'static str,
    priority: &'static str,
    due_date: Option<DateTime<Utc>>,
    estimated_time: Option<String>,
    assigned_user_ids: Vec<UserId>,
    created_by_user_id: UserId,
    client_id: Option<ClientId>,
    project_id: Option<ProjectId>,
    attachment: Option<TaskAttachment>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CreateTaskBody {
    client_request_id: ClientRequestId,
    message: NewMessageBody,
    task: NewTaskBody,
}

impl From<CreateTaskWithMessage> for CreateTaskBody {
    fn from(request: CreateTaskWithMessage) -> Self {
        Self {
            client_request_id: request.request_id,
            message: NewMessageBody {
                content: request.content,
                message_type: TASK_MESSAGE_TYPE,
                sender_id: request.sender_id,
            },
            task: NewTaskBody {
                title: request.title,
                description: request.description,
                status: request.status.as_str(),
                priority: request.priority.as_str(),
                due_date: request.due_date,
                estimated_time: request.estimated_time,
                assigned_user_ids: request.assigned_user_ids.into_iter().collect(),
                created_by_user_id: request.sender_id,
                client_id: request.client_id,
                project_id: request.project_id,
                attachment: request.attachment,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct CreationReplyDto {
    #[serde(default)]
    task: Option<TaskDto>,
    #[serde(default)]
    message: Option<MessageDto>,
}

impl CreationReplyDto {
    pub(super) fn into_reply(self) -> GatewayResult<CreationReply> {
        Ok(CreationReply {
            task: self.task.map(TaskDto::into_task).transpose()?,
            message: self.message.map(MessageDto::into_message).transpose()?,
        })
    }
}
