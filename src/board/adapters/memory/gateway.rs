//! In-memory board server.

use crate::board::domain::{
    ClientRequestId, DirectoryUser, DiscussionId, DiscussionMessage, MessageBody, MessageData,
    MessageId, Task, TaskAssignment, TaskData, TaskId, TaskSnapshot, UserId,
};
use crate::board::ports::{
    BoardGateway, CreateTaskWithMessage, CreationReply, FieldUpdate, GatewayError, GatewayResult,
    StatusUpdate,
};
use async_trait::async_trait;
use mockable::{Clock, DefaultClock};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};
use std::time::Duration;

/// Remote endpoints of the board server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Task listing of a discussion.
    LoadBoard,
    /// Status change.
    UpdateStatus,
    /// Field edit.
    UpdateFields,
    /// Assignment listing.
    ListAssignments,
    /// Combined task and message creation.
    CreateTaskWithMessage,
    /// User directory.
    ListUsers,
    /// Message listing of a discussion.
    ListMessages,
}

/// A request received by [`InMemoryBoardGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    /// Task listing.
    LoadBoard(DiscussionId),
    /// Status change.
    UpdateStatus {
        /// Target task.
        task_id: TaskId,
        /// Request body.
        update: StatusUpdate,
    },
    /// Field edit.
    UpdateFields(TaskId),
    /// Assignment listing.
    ListAssignments,
    /// Combined creation.
    CreateTaskWithMessage {
        /// Discussion receiving the message.
        discussion_id: DiscussionId,
        /// Deduplication key.
        request_id: ClientRequestId,
    },
    /// User directory.
    ListUsers,
    /// Message listing.
    ListMessages(DiscussionId),
}

impl GatewayCall {
    /// Returns the endpoint the call hit.
    #[must_use]
    pub const fn endpoint(&self) -> Endpoint {
        match self {
            Self::LoadBoard(_) => Endpoint::LoadBoard,
            Self::UpdateStatus { .. } => Endpoint::UpdateStatus,
            Self::UpdateFields(_) => Endpoint::UpdateFields,
            Self::ListAssignments => Endpoint::ListAssignments,
            Self::CreateTaskWithMessage { .. } => Endpoint::CreateTaskWithMessage,
            Self::ListUsers => Endpoint::ListUsers,
            Self::ListMessages(_) => Endpoint::ListMessages,
        }
    }

    /// Returns the discussion a call is scoped to, if any.
    #[must_use]
    pub const fn discussion_id(&self) -> Option<DiscussionId> {
        match self {
            Self::LoadBoard(id) | Self::ListMessages(id) => Some(*id),
            Self::CreateTaskWithMessage { discussion_id, .. } => Some(*discussion_id),
            Self::UpdateStatus { .. }
            | Self::UpdateFields(_)
            | Self::ListAssignments
            | Self::ListUsers => None,
        }
    }
}

/// Malformed creation reply the gateway can be told to return once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreationFault {
    /// The reply omits the task.
    MissingTask,
    /// The reply omits the message.
    MissingMessage,
    /// The message references a different task.
    MismatchedMessage,
}

#[derive(Debug, Default)]
struct ServerState {
    tasks: BTreeMap<TaskId, Task>,
    messages: Vec<DiscussionMessage>,
    users: Vec<DirectoryUser>,
    assignments: Vec<TaskAssignment>,
    last_task_id: i64,
    last_message_id: i64,
    completed: HashMap<ClientRequestId, CreationReply>,
    failing: HashSet<Endpoint>,
    failing_once: HashSet<Endpoint>,
    creation_fault: Option<CreationFault>,
    silent_status_updates: bool,
    latency: Duration,
    calls: Vec<GatewayCall>,
}

impl ServerState {
    fn should_fail(&mut self, endpoint: Endpoint) -> bool {
        self.failing_once.remove(&endpoint) || self.failing.contains(&endpoint)
    }

    fn store_task(&mut self, task: Task) {
        self.last_task_id = self.last_task_id.max(task.id().value());
        self.tasks.insert(task.id(), task);
    }

    fn store_message(&mut self, message: DiscussionMessage) {
        self.last_message_id = self.last_message_id.max(message.id().value());
        self.messages.retain(|existing| existing.id() != message.id());
        self.messages.push(message);
        self.messages.sort_by_key(DiscussionMessage::sent_at);
    }

    fn allocate_task_id(&mut self) -> TaskId {
        self.last_task_id += 1;
        TaskId::new(self.last_task_id)
    }

    fn allocate_message_id(&mut self) -> MessageId {
        self.last_message_id += 1;
        MessageId::new(self.last_message_id)
    }

    fn next_sort_order(&self, created: &CreateTaskWithMessage) -> i32 {
        self.tasks
            .values()
            .filter(|task| {
                task.discussion_id() == created.discussion_id && task.status() == created.status
            })
            .map(Task::sort_order)
            .max()
            .map_or(0, |highest| highest.saturating_add(1))
    }

    fn refresh_message(&mut self, task: &Task) {
        for message in &mut self.messages {
            message.refresh_snapshot(task);
        }
    }
}

/// Thread-safe stand-in for the board server.
///
/// Cloning the gateway shares the same server state.
#[derive(Clone)]
pub struct InMemoryBoardGateway {
    state: Arc<RwLock<ServerState>>,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl fmt::Debug for InMemoryBoardGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryBoardGateway")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Default for InMemoryBoardGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBoardGateway {
    /// Creates an empty server using the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(DefaultClock))
    }

    /// Creates an empty server stamping changes with `clock`.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            state: Arc::new(RwLock::new(ServerState::default())),
            clock,
        }
    }

    fn state_mut(&self) -> RwLockWriteGuard<'_, ServerState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn server(&self) -> GatewayResult<RwLockWriteGuard<'_, ServerState>> {
        self.state
            .write()
            .map_err(|err| GatewayError::transport(std::io::Error::other(err.to_string())))
    }

    /// Stores a task as if another client had created it.
    pub fn insert_task(&self, task: Task) {
        let mut state = self.state_mut();
        for user_id in task.assigned_user_ids() {
            state.assignments.push(TaskAssignment {
                task_id: task.id(),
                user_id: *user_id,
            });
        }
        state.store_task(task);
    }

    /// Deletes a task and its assignment rows, as another client would.
    pub fn remove_task(&self, task_id: TaskId) {
        let mut state = self.state_mut();
        state.tasks.remove(&task_id);
        state
            .assignments
            .retain(|assignment| assignment.task_id != task_id);
    }

    /// Stores a message as if another client had sent it.
    pub fn insert_message(&self, message: DiscussionMessage) {
        self.state_mut().store_message(message);
    }

    /// Replaces the user directory.
    pub fn set_users(&self, users: impl IntoIterator<Item = DirectoryUser>) {
        self.state_mut().users = users.into_iter().collect();
    }

    /// Adds an assignment row without touching the task projection.
    pub fn assign(&self, task_id: TaskId, user_id: UserId) {
        self.state_mut()
            .assignments
            .push(TaskAssignment { task_id, user_id });
    }

    /// Returns the server copy of a task.
    #[must_use]
    pub fn task(&self, task_id: TaskId) -> Option<Task> {
        self.state_mut().tasks.get(&task_id).cloned()
    }

    /// Returns the server copy of a discussion's messages.
    #[must_use]
    pub fn messages(&self, discussion_id: DiscussionId) -> Vec<DiscussionMessage> {
        self.state_mut()
            .messages
            .iter()
            .filter(|message| message.discussion_id() == discussion_id)
            .cloned()
            .collect()
    }

    /// Makes every call to `endpoint` fail until [`Self::recover`].
    pub fn fail(&self, endpoint: Endpoint) {
        self.state_mut().failing.insert(endpoint);
    }

    /// Makes the next call to `endpoint` fail.
    pub fn fail_once(&self, endpoint: Endpoint) {
        self.state_mut().failing_once.insert(endpoint);
    }

    /// Clears injected failures of `endpoint`.
    pub fn recover(&self, endpoint: Endpoint) {
        let mut state = self.state_mut();
        state.failing.remove(&endpoint);
        state.failing_once.remove(&endpoint);
    }

    /// Makes the next creation reply malformed. The server still stores the
    /// task and message.
    pub fn corrupt_next_creation(&self, fault: CreationFault) {
        self.state_mut().creation_fault = Some(fault);
    }

    /// Chooses whether status updates echo the task (`true`, the default) or
    /// answer with an empty body.
    pub fn echo_status_updates(&self, echo: bool) {
        self.state_mut().silent_status_updates = !echo;
    }

    /// Delays every response by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.state_mut().latency = latency;
    }

    /// Returns every call received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.state_mut().calls.clone()
    }

    /// Returns how many calls hit `endpoint`.
    #[must_use]
    pub fn call_count(&self, endpoint: Endpoint) -> usize {
        self.state_mut()
            .calls
            .iter()
            .filter(|call| call.endpoint() == endpoint)
            .count()
    }

    /// Forgets the call log.
    pub fn clear_calls(&self) {
        self.state_mut().calls.clear();
    }

    async fn enter(&self, call: GatewayCall) -> GatewayResult<()> {
        let endpoint = call.endpoint();
        let (latency, failed) = {
            let mut state = self.server()?;
            state.calls.push(call);
            (state.latency, state.should_fail(endpoint))
        };
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        if failed {
            return Err(GatewayError::Status {
                status: 503,
                body: format!("{endpoint:?} is unavailable"),
            });
        }
        Ok(())
    }
}

fn not_found(task_id: TaskId) -> GatewayError {
    GatewayError::Status {
        status: 404,
        body: format!("task {task_id} does not exist"),
    }
}

fn apply_fault(reply: CreationReply, fault: Option<CreationFault>) -> CreationReply {
    match fault {
        None => reply,
        Some(CreationFault::MissingTask) => CreationReply {
            task: None,
            ..reply
        },
        Some(CreationFault::MissingMessage) => CreationReply {
            message: None,
            ..reply
        },
        Some(CreationFault::MismatchedMessage) => CreationReply {
            message: reply.message.map(|message| {
                let mut snapshot = message.task_snapshot().cloned();
                if let Some(taken) = snapshot.as_mut() {
                    taken.task_id = TaskId::new(taken.task_id.value().saturating_add(1));
                }
                DiscussionMessage::from_data(MessageData {
                    id: message.id(),
                    discussion_id: message.discussion_id(),
                    sender_id: message.sender_id(),
                    content: message.content().to_owned(),
                    body: snapshot.map_or(MessageBody::Text, MessageBody::Task),
                    sent_at: message.sent_at(),
                    edited: message.edited(),
                })
            }),
            ..reply
        },
    }
}

#[async_trait]
impl BoardGateway for InMemoryBoardGateway {
    async fn load_board(&self, discussion_id: DiscussionId) -> GatewayResult<Vec<Task>> {
        self.enter(GatewayCall::LoadBoard(discussion_id)).await?;
        let state = self.server()?;
        Ok(state
            .tasks
            .values()
            .filter(|task| task.discussion_id() == discussion_id)
            .cloned()
            .collect())
    }

    async fn update_status(
        &self,
        task_id: TaskId,
        update: StatusUpdate,
    ) -> GatewayResult<Option<Task>> {
        self.enter(GatewayCall::UpdateStatus { task_id, update })
            .await?;
        let now = self.clock.utc();
        let mut state = self.server()?;
        let task = state.tasks.get_mut(&task_id).ok_or_else(|| not_found(task_id))?;
        task.set_status(update.status);
        task.stamp(now);
        let updated = task.clone();
        state.refresh_message(&updated);
        Ok((!state.silent_status_updates).then_some(updated))
    }

    async fn update_fields(&self, task_id: TaskId, update: FieldUpdate) -> GatewayResult<Task> {
        self.enter(GatewayCall::UpdateFields(task_id)).await?;
        let now = self.clock.utc();
        let mut state = self.server()?;
        let task = state.tasks.get_mut(&task_id).ok_or_else(|| not_found(task_id))?;
        task.apply_patch(&update.patch);
        task.stamp(now);
        let updated = task.clone();
        state.refresh_message(&updated);
        Ok(updated)
    }

    async fn list_assignments(&self) -> GatewayResult<Vec<TaskAssignment>> {
        self.enter(GatewayCall::ListAssignments).await?;
        Ok(self.server()?.assignments.clone())
    }

    async fn create_task_with_message(
        &self,
        request: CreateTaskWithMessage,
    ) -> GatewayResult<CreationReply> {
        self.enter(GatewayCall::CreateTaskWithMessage {
            discussion_id: request.discussion_id,
            request_id: request.request_id,
        })
        .await?;
        let now = self.clock.utc();
        let mut state = self.server()?;
        if let Some(reply) = state.completed.get(&request.request_id) {
            return Ok(reply.clone());
        }
        let unknown = request
            .assigned_user_ids
            .iter()
            .find(|id| !state.users.iter().any(|user| user.id == **id));
        if let Some(user_id) = unknown {
            return Err(GatewayError::Status {
                status: 400,
                body: format!("user {user_id} does not exist"),
            });
        }

        let task_id = state.allocate_task_id();
        let message_id = state.allocate_message_id();
        let mut data = TaskData::new(
            task_id,
            request.title.clone(),
            request.sender_id,
            request.discussion_id,
        )
        .with_status(request.status)
        .with_priority(request.priority)
        .with_assignees(request.assigned_user_ids.iter().copied())
        .with_sort_order(state.next_sort_order(&request))
        .with_updated_at(now);
        data.description.clone_from(&request.description);
        data.due_date = request.due_date;
        data.estimated_time.clone_from(&request.estimated_time);
        data.client_id = request.client_id;
        data.project_id = request.project_id;
        data.attachment.clone_from(&request.attachment);
        let task = Task::from_data(data);
        let message = DiscussionMessage::from_data(MessageData {
            id: message_id,
            discussion_id: request.discussion_id,
            sender_id: request.sender_id,
            content: request.content.clone(),
            body: MessageBody::Task(TaskSnapshot::of(&task)),
            sent_at: now,
            edited: false,
        });

        state.store_task(task.clone());
        state.store_message(message.clone());
        state.assignments.extend(
            request
                .assigned_user_ids
                .iter()
                .map(|user_id| TaskAssignment {
                    task_id,
                    user_id: *user_id,
                }),
        );
        let reply = CreationReply {
            task: Some(task),
            message: Some(message),
        };
        state.completed.insert(request.request_id, reply.clone());
        let fault = state.creation_fault.take();
        Ok(apply_fault(reply, fault))
    }

    async fn list_users(&self) -> GatewayResult<Vec<DirectoryUser>> {
        self.enter(GatewayCall::ListUsers).await?;
        Ok(self.server()?.users.clone())
    }

    async fn list_messages(
        &self,
        discussion_id: DiscussionId,
    ) -> GatewayResult<Vec<DiscussionMessage>> {
        self.enter(GatewayCall::ListMessages(discussion_id)).await?;
        Ok(self.messages(discussion_id))
    }
}
