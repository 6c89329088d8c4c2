//! REST adapter for the board endpoints.

mod wire;

use crate::board::domain::{
    DirectoryUser, DiscussionId, DiscussionMessage, Task, TaskAssignment, TaskId,
};
use crate::board::ports::{
    BoardGateway, CreateTaskWithMessage, CreationReply, FieldUpdate, GatewayError, GatewayResult,
    StatusUpdate,
};
use crate::config::BoardConfig;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;
use wire::{
    AssignmentDto, BoardDto, CreateTaskBody, CreationReplyDto, FieldUpdateBody, MessageDto,
    StatusUpdateBody, TaskDto, UserDto,
};

/// Board gateway speaking JSON over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBoardGateway {
    client: Client,
    base_url: String,
}

impl HttpBoardGateway {
    /// Builds a client for the configured base URL and timeout.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Transport`] when the HTTP client cannot be
    /// initialized.
    pub fn new(config: &BoardConfig) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(GatewayError::transport)?;
        Ok(Self::with_client(config, client))
    }

    /// Uses an already configured client.
    #[must_use]
    pub fn with_client(config: &BoardConfig, client: Client) -> Self {
        Self {
            client,
            base_url: config.base_url().to_owned(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send(&self, request: RequestBuilder) -> GatewayResult<Vec<u8>> {
        let response = request.send().await.map_err(GatewayError::transport)?;
        let status = response.status();
        let body = response.bytes().await.map_err(GatewayError::transport)?;
        debug!(status = status.as_u16(), bytes = body.len(), "board endpoint answered");
        if !status.is_success() {
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }
        Ok(body.to_vec())
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> GatewayResult<T> {
        let body = self.send(request).await?;
        decode(&body)
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> GatewayResult<T> {
    serde_json::from_slice(body).map_err(|err| GatewayError::Decode(err.to_string()))
}

fn is_blank(body: &[u8]) -> bool {
    body.iter().all(u8::is_ascii_whitespace)
}

#[async_trait]
impl BoardGateway for HttpBoardGateway {
    async fn load_board(&self, discussion_id: DiscussionId) -> GatewayResult<Vec<Task>> {
        let url = self.url(&format!("/discussion/{discussion_id}/tasks-and-media"));
        let board: BoardDto = self.fetch(self.client.get(url)).await?;
        board.into_tasks()
    }

    async fn update_status(
        &self,
        task_id: TaskId,
        update: StatusUpdate,
    ) -> GatewayResult<Option<Task>> {
        let url = self.url(&format!("/Task/{task_id}/status"));
        let request = self.client.put(url).json(&StatusUpdateBody::from(update));
        let body = self.send(request).await?;
        if is_blank(&body) {
            return Ok(None);
        }
        let task: TaskDto = decode(&body)?;
        task.into_task().map(Some)
    }

    async fn update_fields(&self, task_id: TaskId, update: FieldUpdate) -> GatewayResult<Task> {
        let url = self.url(&format!("/Task/{task_id}"));
        let request = self.client.put(url).json(&FieldUpdateBody::from(update));
        let task: TaskDto = self.fetch(request).await?;
        task.into_task()
    }

    async fn list_assignments(&self) -> GatewayResult<Vec<TaskAssignment>> {
        let rows: Vec<AssignmentDto> = self
            .fetch(self.client.get(self.url("/Task/Assignments")))
            .await?;
        Ok(rows.into_iter().map(TaskAssignment::from).collect())
    }

    async fn create_task_with_message(
        &self,
        request: CreateTaskWithMessage,
    ) -> GatewayResult<CreationReply> {
        let url = self.url(&format!(
            "/discussions/{}/create-task-with-message",
            request.discussion_id
        ));
        let body = CreateTaskBody::from(request);
        let reply: CreationReplyDto = self.fetch(self.client.post(url).json(&body)).await?;
        reply.into_reply()
    }

    async fn list_users(&self) -> GatewayResult<Vec<DirectoryUser>> {
        let users: Vec<UserDto> = self.fetch(self.client.get(self.url("/User"))).await?;
        Ok(users.into_iter().map(DirectoryUser::from).collect())
    }

    async fn list_messages(
        &self,
        discussion_id: DiscussionId,
    ) -> GatewayResult<Vec<DiscussionMessage>> {
        let url = self.url(&format!("/discussion/{discussion_id}/messages"));
        let messages: Vec<MessageDto> = self.fetch(self.client.get(url)).await?;
        messages.into_iter().map(MessageDto::into_message).collect()
    }
}
