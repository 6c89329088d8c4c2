//! Client-side board state shared by the board services.
//!
//! All mutation goes through [`Board::write`], which holds the lock only for
//! the duration of a synchronous closure. No lock is ever held across an
//! `.await`.

mod assignments;
mod events;
mod messages;
mod store;
mod users;

pub use assignments::AssignmentIndex;
pub use events::BoardEvent;
pub use messages::MessageLog;
pub use store::{ColumnPosition, SnapshotOutcome, TaskCheckpoint, TaskStore};
pub use users::UserDirectory;

use crate::board::domain::{
    DiscussionId, DiscussionMessage, Task, TaskAssignment, TaskId, TaskStatus,
};
use crate::board::error::{BoardError, BoardResult};
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

/// Default broadcast channel capacity for board events.
const EVENT_CAPACITY: usize = 256;

/// Everything the board keeps in memory.
#[derive(Debug, Clone, Default)]
pub struct BoardState {
    store: TaskStore,
    assignments: AssignmentIndex,
    messages: MessageLog,
    users: UserDirectory,
}

impl BoardState {
    /// Returns the task store.
    #[must_use]
    pub const fn store(&self) -> &TaskStore {
        &self.store
    }

    /// Returns the assignment index.
    #[must_use]
    pub const fn assignments(&self) -> &AssignmentIndex {
        &self.assignments
    }

    /// Returns the message log.
    #[must_use]
    pub const fn messages(&self) -> &MessageLog {
        &self.messages
    }

    /// Returns the cached user directory.
    #[must_use]
    pub const fn users(&self) -> &UserDirectory {
        &self.users
    }

    pub(crate) const fn store_mut(&mut self) -> &mut TaskStore {
        &mut self.store
    }

    pub(crate) const fn users_mut(&mut self) -> &mut UserDirectory {
        &mut self.users
    }

    /// Stores a task as a local write and propagates it to the assignment
    /// index and the correlated message snapshot.
    pub(crate) fn commit_task(&mut self, task: Task) {
        self.assignments.record_task(&task);
        self.messages.sync_task(&task);
        self.store.upsert(task);
    }

    /// Stores a task together with the message that announces it.
    pub(crate) fn commit_task_with_message(&mut self, task: Task, message: DiscussionMessage) {
        self.messages.append(message);
        self.commit_task(task);
    }

    /// Re-synchronizes derived data after the store changed a task in place.
    pub(crate) fn resync_task(&mut self, task_id: TaskId) {
        if let Some(task) = self.store.task(task_id).cloned() {
            self.assignments.record_task(&task);
            self.messages.sync_task(&task);
        }
    }

    /// Reconciles a server listing of a discussion's tasks.
    pub(crate) fn apply_task_snapshot(
        &mut self,
        discussion_id: DiscussionId,
        tasks: Vec<Task>,
        since: u64,
    ) -> SnapshotOutcome {
        let before = self.store.ids_in_discussion(discussion_id);
        let outcome = self.store.apply_snapshot(discussion_id, tasks, since);
        for task_id in before {
            if self.store.task(task_id).is_none() {
                self.assignments.forget_task(task_id);
            }
        }
        for task_id in self.store.ids_in_discussion(discussion_id) {
            self.resync_task(task_id);
        }
        outcome
    }

    /// Replaces a discussion's messages and re-applies current task fields
    /// to their snapshots.
    ///
    /// Task messages of tasks written locally after `since` are kept even
    /// when the listing predates them.
    pub(crate) fn replace_messages(
        &mut self,
        discussion_id: DiscussionId,
        messages: Vec<DiscussionMessage>,
        since: u64,
    ) {
        let store = &self.store;
        self.messages.replace_discussion(discussion_id, messages, |message| {
            message
                .task_id()
                .is_some_and(|task_id| store.task(task_id).is_some() && store.written_since(task_id, since))
        });
        for task_id in self.store.ids_in_discussion(discussion_id) {
            if let Some(task) = self.store.task(task_id) {
                self.messages.sync_task(task);
            }
        }
    }

    pub(crate) fn replace_assignments(
        &mut self,
        assignments: impl IntoIterator<Item = TaskAssignment>,
    ) {
        self.assignments.replace_listing(assignments);
    }
}

/// Shared handle to the board state and its event stream.
///
/// Cloning the handle shares the same state.
#[derive(Debug, Clone)]
pub struct Board {
    state: Arc<RwLock<BoardState>>,
    events: broadcast::Sender<BoardEvent>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Creates an empty board.
    #[must_use]
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: Arc::new(RwLock::new(BoardState::default())),
            events,
        }
    }

    /// Runs `f` with shared access to the state.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::StatePoisoned`] if the lock was poisoned.
    pub fn read<T>(&self, f: impl FnOnce(&BoardState) -> T) -> BoardResult<T> {
        let state = self.state.read().map_err(|_| BoardError::StatePoisoned)?;
        Ok(f(&state))
    }

    pub(crate) fn write<T>(&self, f: impl FnOnce(&mut BoardState) -> T) -> BoardResult<T> {
        let mut state = self.state.write().map_err(|_| BoardError::StatePoisoned)?;
        Ok(f(&mut state))
    }

    /// Subscribes to committed board changes.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<BoardEvent> {
        self.events.subscribe()
    }

    pub(crate) fn emit(&self, event: BoardEvent) {
        if self.events.send(event).is_err() {
            tracing::trace!("board event dropped: no subscribers");
        }
    }

    /// Returns a copy of a task.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::StatePoisoned`] if the lock was poisoned.
    pub fn task(&self, id: TaskId) -> BoardResult<Option<Task>> {
        self.read(|state| state.store().task(id).cloned())
    }

    /// Returns a copy of a column in display order.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::StatePoisoned`] if the lock was poisoned.
    pub fn column(&self, status: TaskStatus) -> BoardResult<Vec<Task>> {
        self.read(|state| state.store().column(status).into_iter().cloned().collect())
    }

    /// Returns the ids of a column in display order.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::StatePoisoned`] if the lock was poisoned.
    pub fn column_ids(&self, status: TaskStatus) -> BoardResult<Vec<TaskId>> {
        self.read(|state| state.store().column_ids(status).to_vec())
    }

    /// Finds where a task sits.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::StatePoisoned`] if the lock was poisoned.
    pub fn locate(&self, id: TaskId) -> BoardResult<Option<ColumnPosition>> {
        self.read(|state| state.store().locate(id))
    }

    /// Returns a copy of a discussion's messages, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::StatePoisoned`] if the lock was poisoned.
    pub fn messages(&self, discussion_id: DiscussionId) -> BoardResult<Vec<DiscussionMessage>> {
        self.read(|state| state.messages().messages(discussion_id).to_vec())
    }

    /// Seeds the board with already-confirmed tasks, as a board load does.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::StatePoisoned`] if the lock was poisoned.
    pub fn seed(&self, discussion_id: DiscussionId, tasks: Vec<Task>) -> BoardResult<SnapshotOutcome> {
        self.write(|state| {
            let since = state.store().generation();
            state.apply_task_snapshot(discussion_id, tasks, since)
        })
    }
}
