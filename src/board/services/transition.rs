//! Status transition engine: validation, remote persistence and rollback.

use super::pending::PendingChange;
use crate::board::domain::{Task, TaskId, TaskStatus, UserId};
use crate::board::error::{BoardError, BoardResult};
use crate::board::ports::{BoardGateway, Notice, Notifier, StatusUpdate};
use crate::board::state::{Board, BoardEvent};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
enum TargetStatus {
    Known(TaskStatus),
    Raw(String),
}

/// Request to move a task to another status column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRequest {
    task_id: TaskId,
    target: TargetStatus,
    actor: Option<UserId>,
}

impl TransitionRequest {
    /// Creates a request from a raw status value, as received from a UI
    /// control or a column key. The value is validated by the engine.
    #[must_use]
    pub fn new(task_id: TaskId, target_status: impl Into<String>) -> Self {
        Self {
            task_id,
            target: TargetStatus::Raw(target_status.into()),
            actor: None,
        }
    }

    /// Creates a request for an already-typed status.
    #[must_use]
    pub const fn to_status(task_id: TaskId, status: TaskStatus) -> Self {
        Self {
            task_id,
            target: TargetStatus::Known(status),
            actor: None,
        }
    }

    /// Sets the acting user.
    #[must_use]
    pub const fn acting_as(self, user: UserId) -> Self {
        self.with_actor(Some(user))
    }

    /// Sets or clears the acting user.
    #[must_use]
    pub const fn with_actor(mut self, actor: Option<UserId>) -> Self {
        self.actor = actor;
        self
    }

    /// Returns the task to move.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    fn resolve_status(&self) -> BoardResult<TaskStatus> {
        match &self.target {
            TargetStatus::Known(status) => Ok(*status),
            TargetStatus::Raw(raw) => Ok(TaskStatus::try_from(raw.as_str())?),
        }
    }
}

/// Result of a successful transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The task already had the requested status; nothing was sent.
    Unchanged(Task),
    /// The task moved and the server confirmed it.
    Moved {
        /// The task after the move.
        task: Task,
        /// Column the task left.
        from: TaskStatus,
    },
}

impl TransitionOutcome {
    /// Returns the task after the operation.
    #[must_use]
    pub const fn task(&self) -> &Task {
        match self {
            Self::Unchanged(task) | Self::Moved { task, .. } => task,
        }
    }
}

/// Validates and applies status changes.
///
/// Every transition is applied locally first and rolled back if the server
/// rejects it, so the visible column never disagrees with the last state the
/// server confirmed.
pub struct StatusTransitionEngine<G, N>
where
    G: BoardGateway,
    N: Notifier,
{
    board: Board,
    gateway: Arc<G>,
    notifier: Arc<N>,
}

impl<G, N> StatusTransitionEngine<G, N>
where
    G: BoardGateway,
    N: Notifier,
{
    /// Creates a transition engine over a shared board.
    #[must_use]
    pub const fn new(board: Board, gateway: Arc<G>, notifier: Arc<N>) -> Self {
        Self {
            board,
            gateway,
            notifier,
        }
    }

    /// Returns the board this engine mutates.
    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// Moves a task to another column and persists the change.
    ///
    /// # Errors
    ///
    /// - [`BoardError::MissingActor`] when no acting user is set
    /// - [`BoardError::InvalidStatus`] when the target is not a column
    /// - [`BoardError::TaskNotFound`] when the task is not on the board
    /// - [`BoardError::PermissionDenied`] when the actor is neither creator
    ///   nor assignee
    /// - [`BoardError::ChangeInFlight`] when another change is pending
    ///
    /// None of the above reach the network or touch the store.
    /// [`BoardError::NetworkFailure`] is returned after the task has been
    /// restored to its previous column.
    pub async fn transition(&self, request: TransitionRequest) -> BoardResult<TransitionOutcome> {
        let task_id = request.task_id();
        let (actor, target, task) = self.validate(&request).inspect_err(|err| {
            warn!(task_id = %task_id, error = %err, "status transition rejected");
        })?;

        let from = task.status();
        if from == target {
            return Ok(TransitionOutcome::Unchanged(task));
        }

        let pending = PendingChange::begin(&self.board, task_id, |state| {
            state.store_mut().move_to(task_id, target);
        })?;
        self.board.emit(BoardEvent::TaskMoved {
            task_id,
            from,
            to: target,
        });

        let update = StatusUpdate {
            status: target,
            updated_by: actor,
        };
        match self.gateway.update_status(task_id, update).await {
            Ok(echo) => {
                pending.confirm(echo)?;
                info!(task_id = %task_id, from = %from, to = %target, user_id = %actor, "task status updated");
                let task = self
                    .board
                    .task(task_id)?
                    .ok_or(BoardError::TaskNotFound(task_id))?;
                if task.status() != target {
                    self.board.emit(BoardEvent::TaskMoved {
                        task_id,
                        from: target,
                        to: task.status(),
                    });
                }
                Ok(TransitionOutcome::Moved { task, from })
            }
            Err(err) => {
                pending.roll_back()?;
                warn!(task_id = %task_id, from = %from, to = %target, error = %err, "status update failed, rolled back");
                self.notifier.notify(
                    Notice::failure(format!("Could not move the task to {target}. It was returned to {from}."))
                        .for_task(task_id),
                );
                Err(BoardError::NetworkFailure(err))
            }
        }
    }

    fn validate(&self, request: &TransitionRequest) -> BoardResult<(UserId, TaskStatus, Task)> {
        let actor = request.actor.ok_or(BoardError::MissingActor)?;
        let target = request.resolve_status()?;
        let task_id = request.task_id();
        self.board.read(|state| {
            let task = state
                .store()
                .task(task_id)
                .ok_or(BoardError::TaskNotFound(task_id))?;
            if !state.assignments().may_transition(task, actor) {
                return Err(BoardError::PermissionDenied {
                    task_id,
                    user_id: actor,
                });
            }
            Ok((actor, target, task.clone()))
        })?
    }
}
