//! Drag-and-drop between status columns.

use super::transition::{StatusTransitionEngine, TransitionOutcome, TransitionRequest};
use crate::board::domain::{TaskId, TaskStatus, UserId};
use crate::board::error::{BoardError, BoardResult};
use crate::board::ports::{BoardGateway, Notifier};
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Record of a drag in progress.
///
/// Returned by [`DragReorderController::begin_drag`] and consumed by
/// [`DragReorderController::complete_drop`] or
/// [`DragReorderController::cancel_drag`]. The ticket is neither `Clone` nor
/// `Copy`, so a finished drag can never be replayed.
#[derive(Debug, PartialEq, Eq)]
pub struct DragTicket {
    id: Uuid,
    task_id: TaskId,
    source: TaskStatus,
}

impl DragTicket {
    /// Returns the dragged task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the column the drag started from.
    #[must_use]
    pub const fn source(&self) -> TaskStatus {
        self.source
    }
}

impl fmt::Display for DragTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "drag {} of task {} from {}", self.id, self.task_id, self.source)
    }
}

/// Where a dragged task was released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    /// Over a status column.
    Column(TaskStatus),
    /// Outside any column.
    Outside,
}

impl DropTarget {
    /// Resolves the column key reported by the UI. `None` means the drop
    /// happened outside any column.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::InvalidStatus`] for an unknown column key.
    pub fn from_column_key(key: Option<&str>) -> BoardResult<Self> {
        key.map_or(Ok(Self::Outside), |raw| {
            Ok(Self::Column(TaskStatus::try_from(raw)?))
        })
    }
}

/// What a drop did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// The task moved to the end of the target column.
    Moved {
        /// Moved task.
        task_id: TaskId,
        /// Source column.
        from: TaskStatus,
        /// Target column.
        to: TaskStatus,
    },
    /// Dropped on its own column; nothing happened.
    SameColumn,
    /// Dropped outside any column; nothing happened.
    Outside,
    /// The task left the source column while being dragged; nothing
    /// happened.
    Stale,
}

/// Turns drag gestures into status transitions.
pub struct DragReorderController<G, N>
where
    G: BoardGateway,
    N: Notifier,
{
    engine: Arc<StatusTransitionEngine<G, N>>,
}

impl<G, N> DragReorderController<G, N>
where
    G: BoardGateway,
    N: Notifier,
{
    /// Creates a controller delegating to `engine`.
    #[must_use]
    pub const fn new(engine: Arc<StatusTransitionEngine<G, N>>) -> Self {
        Self { engine }
    }

    /// Starts dragging a task, recording its current column.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::TaskNotFound`] when the task is not on the
    /// board.
    pub fn begin_drag(&self, task_id: TaskId) -> BoardResult<DragTicket> {
        let position = self
            .engine
            .board()
            .locate(task_id)?
            .ok_or(BoardError::TaskNotFound(task_id))?;
        let ticket = DragTicket {
            id: Uuid::new_v4(),
            task_id,
            source: position.status,
        };
        debug!(%ticket, "drag started");
        Ok(ticket)
    }

    /// Abandons a drag without touching the board.
    #[expect(
        clippy::needless_pass_by_value,
        reason = "consuming the ticket ends the drag"
    )]
    pub fn cancel_drag(&self, ticket: DragTicket) {
        debug!(%ticket, "drag cancelled");
    }

    /// Completes a drag by releasing the task over `target`.
    ///
    /// The ticket is consumed whatever the result.
    ///
    /// # Errors
    ///
    /// Propagates every error of
    /// [`StatusTransitionEngine::transition`]; on
    /// [`BoardError::NetworkFailure`] the task is back in its source column.
    pub async fn complete_drop(
        &self,
        ticket: DragTicket,
        target: DropTarget,
        actor: Option<UserId>,
    ) -> BoardResult<DropOutcome> {
        let DragTicket { id, task_id, source } = ticket;
        let DropTarget::Column(to) = target else {
            debug!(drag_id = %id, task_id = %task_id, "dropped outside any column");
            return Ok(DropOutcome::Outside);
        };
        if to == source {
            return Ok(DropOutcome::SameColumn);
        }
        let current = self.engine.board().locate(task_id)?;
        if current.map(|position| position.status) != Some(source) {
            debug!(drag_id = %id, task_id = %task_id, "task left its source column during the drag");
            return Ok(DropOutcome::Stale);
        }

        let request = TransitionRequest::to_status(task_id, to).with_actor(actor);
        match self.engine.transition(request).await? {
            TransitionOutcome::Unchanged(_) => Ok(DropOutcome::SameColumn),
            TransitionOutcome::Moved { task, from } => Ok(DropOutcome::Moved {
                task_id: task.id(),
                from,
                to: task.status(),
            }),
        }
    }
}
