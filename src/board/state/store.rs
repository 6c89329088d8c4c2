//! Column-partitioned task store.

use crate::board::domain::{DiscussionId, Task, TaskId, TaskStatus};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Where a task sits on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnPosition {
    /// Column the task is in.
    pub status: TaskStatus,
    /// Zero-based index within the column.
    pub index: usize,
}

/// Pre-image of a task captured before an optimistic change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskCheckpoint {
    pub(crate) task: Task,
    pub(crate) position: ColumnPosition,
}

impl TaskCheckpoint {
    /// Returns the task as it was before the change.
    #[must_use]
    pub const fn task(&self) -> &Task {
        &self.task
    }

    /// Returns the column position before the change.
    #[must_use]
    pub const fn position(&self) -> ColumnPosition {
        self.position
    }
}

/// Counts of a snapshot application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotOutcome {
    /// Rows inserted or replaced.
    pub applied: usize,
    /// Rows ignored because local state is newer.
    pub skipped: usize,
    /// Local tasks removed because the server no longer lists them.
    pub removed: usize,
}

/// In-memory partition of tasks by status column.
///
/// # Invariants
///
/// - every stored task appears in exactly one column
/// - that column equals the task's own status
/// - columns keep insertion order; moves append at the end
#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    tasks: HashMap<TaskId, Task>,
    columns: BTreeMap<TaskStatus, Vec<TaskId>>,
    generation: u64,
    last_local_write: HashMap<TaskId, u64>,
    in_flight: HashSet<TaskId>,
}

impl TaskStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns `true` when no task is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Looks up a task.
    #[must_use]
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(&id)
    }

    /// Returns the ids of a column in display order.
    #[must_use]
    pub fn column_ids(&self, status: TaskStatus) -> &[TaskId] {
        self.columns.get(&status).map_or(&[], Vec::as_slice)
    }

    /// Returns the tasks of a column in display order.
    #[must_use]
    pub fn column(&self, status: TaskStatus) -> Vec<&Task> {
        self.column_ids(status)
            .iter()
            .filter_map(|id| self.tasks.get(id))
            .collect()
    }

    /// Finds the column and index of a task.
    #[must_use]
    pub fn locate(&self, id: TaskId) -> Option<ColumnPosition> {
        let status = self.tasks.get(&id)?.status();
        let index = self.column_ids(status).iter().position(|entry| *entry == id)?;
        Some(ColumnPosition { status, index })
    }

    /// Returns the ids of every task owned by a discussion.
    #[must_use]
    pub fn ids_in_discussion(&self, discussion_id: DiscussionId) -> Vec<TaskId> {
        self.tasks
            .values()
            .filter(|task| task.discussion_id() == discussion_id)
            .map(Task::id)
            .collect()
    }

    /// Returns the local write generation counter.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns `true` while a status change for the task awaits the server.
    #[must_use]
    pub fn is_in_flight(&self, id: TaskId) -> bool {
        self.in_flight.contains(&id)
    }

    /// Checks that every task sits in exactly the column matching its status.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let mut seen = HashSet::new();
        for (status, ids) in &self.columns {
            for id in ids {
                let matches = self.tasks.get(id).is_some_and(|task| task.status() == *status);
                if !matches || !seen.insert(*id) {
                    return false;
                }
            }
        }
        seen.len() == self.tasks.len()
    }

    /// Inserts or replaces a task as a local write.
    ///
    /// A task staying in its column keeps its position; otherwise it is
    /// appended to the end of its new column.
    pub fn upsert(&mut self, task: Task) {
        let id = task.id();
        self.place(task);
        self.record_local_write(id);
    }

    /// Captures the pre-image of a task for later rollback.
    #[must_use]
    pub fn checkpoint(&self, id: TaskId) -> Option<TaskCheckpoint> {
        let position = self.locate(id)?;
        let task = self.tasks.get(&id)?.clone();
        Some(TaskCheckpoint { task, position })
    }

    /// Moves a task to the end of `status` as a local write.
    ///
    /// Returns the moved task, or `None` when it is not stored.
    pub fn move_to(&mut self, id: TaskId, status: TaskStatus) -> Option<&Task> {
        let mut task = self.tasks.get(&id)?.clone();
        task.set_status(status);
        self.upsert(task);
        self.tasks.get(&id)
    }

    /// Restores a task to its checkpointed state and column position.
    pub fn restore(&mut self, checkpoint: TaskCheckpoint) {
        let TaskCheckpoint { task, position } = checkpoint;
        let id = task.id();
        self.detach(id);
        let column = self.columns.entry(position.status).or_default();
        let index = position.index.min(column.len());
        column.insert(index, id);
        self.tasks.insert(id, task);
        self.record_local_write(id);
    }

    /// Marks a status change as awaiting the server.
    ///
    /// Returns `false` if one is already pending for the task.
    pub fn begin_in_flight(&mut self, id: TaskId) -> bool {
        self.in_flight.insert(id)
    }

    /// Clears the pending marker of a task.
    pub fn end_in_flight(&mut self, id: TaskId) {
        self.in_flight.remove(&id);
    }

    /// Reconciles the store with a server listing of a discussion's tasks.
    ///
    /// `since` is the generation captured before the listing was requested.
    /// Rows for tasks written locally after that point, tasks with a pending
    /// status change, and rows whose server stamp is older than the stored
    /// one are ignored so that a slow read never overwrites a newer write.
    pub fn apply_snapshot(
        &mut self,
        discussion_id: DiscussionId,
        mut incoming: Vec<Task>,
        since: u64,
    ) -> SnapshotOutcome {
        let mut outcome = SnapshotOutcome::default();
        incoming.sort_by_key(|task| (task.sort_order(), task.id()));
        let listed: HashSet<TaskId> = incoming.iter().map(Task::id).collect();

        for task in incoming {
            if self.written_since(task.id(), since) || self.is_superseded(&task) {
                outcome.skipped += 1;
                continue;
            }
            self.place(task);
            outcome.applied += 1;
        }

        let vanished: Vec<TaskId> = self
            .tasks
            .values()
            .filter(|task| task.discussion_id() == discussion_id && !listed.contains(&task.id()))
            .map(Task::id)
            .filter(|id| !self.written_since(*id, since))
            .collect();
        for id in vanished {
            self.detach(id);
            self.tasks.remove(&id);
            self.last_local_write.remove(&id);
            outcome.removed += 1;
        }
        outcome
    }

    /// Returns `true` when the task was written locally after generation
    /// `since` or has a change awaiting the server.
    #[must_use]
    pub fn written_since(&self, id: TaskId, since: u64) -> bool {
        self.in_flight.contains(&id)
            || self
                .last_local_write
                .get(&id)
                .is_some_and(|written| *written > since)
    }

    /// Both stamps come from the server; local edits keep the last one seen.
    fn is_superseded(&self, incoming: &Task) -> bool {
        let local = self.tasks.get(&incoming.id()).and_then(Task::updated_at);
        match (local, incoming.updated_at()) {
            (Some(local_at), Some(incoming_at)) => local_at > incoming_at,
            _ => false,
        }
    }

    fn place(&mut self, task: Task) {
        let id = task.id();
        let status = task.status();
        let same_column = self.tasks.get(&id).is_some_and(|existing| existing.status() == status);
        if !same_column {
            self.detach(id);
            self.columns.entry(status).or_default().push(id);
        }
        self.tasks.insert(id, task);
    }

    fn detach(&mut self, id: TaskId) {
        if let Some(status) = self.tasks.get(&id).map(Task::status) {
            if let Some(column) = self.columns.get_mut(&status) {
                column.retain(|entry| *entry != id);
            }
        }
    }

    /// Records a local write of a task at a fresh generation.
    pub(crate) fn record_local_write(&mut self, id: TaskId) {
        self.generation += 1;
        self.last_local_write.insert(id, self.generation);
    }
}
