//! Field edits (title, description, priority, due date) outside the status
//! workflow.

use super::pending::PendingChange;
use crate::board::domain::{Task, TaskId, TaskPatch};
use crate::board::error::{BoardError, BoardResult};
use crate::board::ports::{BoardGateway, FieldUpdate, Notice, Notifier};
use crate::board::state::{Board, BoardEvent};
use mockable::Clock;
use std::sync::Arc;
use tracing::{info, warn};

/// Applies partial field edits with the same rollback discipline as status
/// transitions.
pub struct TaskEditor<G, N, C>
where
    G: BoardGateway,
    N: Notifier,
    C: Clock + Send + Sync,
{
    board: Board,
    gateway: Arc<G>,
    notifier: Arc<N>,
    clock: Arc<C>,
}

impl<G, N, C> TaskEditor<G, N, C>
where
    G: BoardGateway,
    N: Notifier,
    C: Clock + Send + Sync,
{
    /// Creates an editor over a shared board.
    #[must_use]
    pub const fn new(board: Board, gateway: Arc<G>, notifier: Arc<N>, clock: Arc<C>) -> Self {
        Self {
            board,
            gateway,
            notifier,
            clock,
        }
    }

    /// Edits task fields and persists the edit.
    ///
    /// The edit shows immediately; the task message snapshot follows it. An
    /// empty patch returns the current task without a remote call.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::TaskNotFound`] or [`BoardError::ChangeInFlight`]
    /// before any remote call, and [`BoardError::NetworkFailure`] after the
    /// edit has been undone.
    pub async fn update_fields(&self, task_id: TaskId, patch: TaskPatch) -> BoardResult<Task> {
        if patch.is_empty() {
            return self
                .board
                .task(task_id)?
                .ok_or(BoardError::TaskNotFound(task_id));
        }

        let now = self.clock.utc();
        let pending = PendingChange::begin(&self.board, task_id, |state| {
            if let Some(mut task) = state.store().task(task_id).cloned() {
                task.apply_patch(&patch);
                state.commit_task(task);
            }
        })?;
        self.board.emit(BoardEvent::TaskUpdated { task_id });

        let update = FieldUpdate {
            patch,
            updated_at: now,
        };
        match self.gateway.update_fields(task_id, update).await {
            Ok(task) => {
                pending.confirm(Some(task))?;
                self.board.emit(BoardEvent::TaskUpdated { task_id });
                info!(task_id = %task_id, "task fields updated");
                self.board
                    .task(task_id)?
                    .ok_or(BoardError::TaskNotFound(task_id))
            }
            Err(err) => {
                pending.roll_back()?;
                warn!(task_id = %task_id, error = %err, "field update failed, rolled back");
                self.notifier
                    .notify(Notice::failure("Your changes to the task were not saved.").for_task(task_id));
                Err(BoardError::NetworkFailure(err))
            }
        }
    }
}
