//! Scoped optimistic change with guaranteed rollback.

use crate::board::domain::{Task, TaskId, TaskStatus};
use crate::board::error::{BoardError, BoardResult};
use crate::board::state::{Board, BoardEvent, BoardState, TaskCheckpoint};
use tracing::warn;

/// An optimistic local change awaiting server confirmation.
///
/// The pre-image is restored unless [`PendingChange::confirm`] is called.
/// Dropping the guard (for example because the awaiting future was
/// cancelled) rolls the change back as well.
pub(crate) struct PendingChange {
    board: Board,
    task_id: TaskId,
    checkpoint: Option<TaskCheckpoint>,
}

impl PendingChange {
    /// Marks the task in flight, captures its pre-image and applies `apply`
    /// under a single write lock.
    pub(crate) fn begin(
        board: &Board,
        task_id: TaskId,
        apply: impl FnOnce(&mut BoardState),
    ) -> BoardResult<Self> {
        let checkpoint = board.write(|state| {
            if state.store().is_in_flight(task_id) {
                return Err(BoardError::ChangeInFlight(task_id));
            }
            let checkpoint = state
                .store()
                .checkpoint(task_id)
                .ok_or(BoardError::TaskNotFound(task_id))?;
            state.store_mut().begin_in_flight(task_id);
            apply(state);
            state.resync_task(task_id);
            Ok(checkpoint)
        })??;
        Ok(Self {
            board: board.clone(),
            task_id,
            checkpoint: Some(checkpoint),
        })
    }

    /// Keeps the change, replacing the optimistic copy with the server's
    /// echo when there is one.
    pub(crate) fn confirm(mut self, confirmed: Option<Task>) -> BoardResult<()> {
        self.checkpoint = None;
        let task_id = self.task_id;
        self.board.write(|state| {
            state.store_mut().end_in_flight(task_id);
            match confirmed {
                Some(task) => state.commit_task(task),
                None => state.store_mut().record_local_write(task_id),
            }
        })
    }

    /// Restores the pre-image and returns the restored column.
    pub(crate) fn roll_back(mut self) -> BoardResult<Option<TaskStatus>> {
        self.restore()
    }

    fn restore(&mut self) -> BoardResult<Option<TaskStatus>> {
        let Some(checkpoint) = self.checkpoint.take() else {
            return Ok(None);
        };
        let task_id = self.task_id;
        let restored = checkpoint.position().status;
        self.board.write(|state| {
            state.store_mut().end_in_flight(task_id);
            state.store_mut().restore(checkpoint);
            state.resync_task(task_id);
        })?;
        self.board.emit(BoardEvent::ChangeRolledBack { task_id, restored });
        Ok(Some(restored))
    }
}

impl Drop for PendingChange {
    fn drop(&mut self) {
        if self.checkpoint.is_none() {
            return;
        }
        match self.restore() {
            Ok(_) => warn!(task_id = %self.task_id, "abandoned change rolled back"),
            Err(err) => warn!(task_id = %self.task_id, error = %err, "rollback of abandoned change failed"),
        }
    }
}
