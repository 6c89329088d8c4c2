//! One refresh round of a discussion's tasks, messages and assignments.

use crate::board::domain::DiscussionId;
use crate::board::error::BoardResult;
use crate::board::ports::{BoardGateway, Notice, Notifier};
use crate::board::state::{Board, BoardEvent, SnapshotOutcome};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

/// Pulls server state for a discussion into the board.
///
/// Rows that are older than a local write made after the request started are
/// ignored, so a slow refresh never undoes a confirmed move.
pub struct BoardSync<G, N>
where
    G: BoardGateway,
    N: Notifier,
{
    board: Board,
    gateway: Arc<G>,
    notifier: Arc<N>,
    failing: AtomicBool,
}

impl<G, N> BoardSync<G, N>
where
    G: BoardGateway,
    N: Notifier,
{
    /// Creates a sync service over a shared board.
    #[must_use]
    pub const fn new(board: Board, gateway: Arc<G>, notifier: Arc<N>) -> Self {
        Self {
            board,
            gateway,
            notifier,
            failing: AtomicBool::new(false),
        }
    }

    /// Returns the board this service refreshes.
    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// Loads the discussion's tasks, messages and the assignment listing and
    /// reconciles them with local state.
    ///
    /// # Errors
    ///
    /// Returns [`crate::board::error::BoardError::NetworkFailure`] when any
    /// of the three calls fails. Local state is left untouched and the user
    /// is notified once per failure streak.
    pub async fn refresh(&self, discussion_id: DiscussionId) -> BoardResult<SnapshotOutcome> {
        let since = self.board.read(|state| state.store().generation())?;
        let (loaded, listed, assigned) = tokio::join!(
            self.gateway.load_board(discussion_id),
            self.gateway.list_messages(discussion_id),
            self.gateway.list_assignments(),
        );
        let fetched = loaded.and_then(|board| Ok((board, listed?, assigned?)));
        let (tasks, messages, assignments) = match fetched {
            Ok(fetched) => fetched,
            Err(err) => {
                warn!(discussion_id = %discussion_id, error = %err, "board refresh failed");
                if !self.failing.swap(true, Ordering::Relaxed) {
                    self.notifier
                        .notify(Notice::failure("The board could not be refreshed."));
                }
                return Err(err.into());
            }
        };
        self.failing.store(false, Ordering::Relaxed);

        let outcome = self.board.write(|state| {
            state.replace_assignments(assignments);
            let outcome = state.apply_task_snapshot(discussion_id, tasks, since);
            state.replace_messages(discussion_id, messages, since);
            outcome
        })?;
        debug!(
            discussion_id = %discussion_id,
            applied = outcome.applied,
            skipped = outcome.skipped,
            removed = outcome.removed,
            "board refreshed"
        );
        self.board.emit(BoardEvent::SnapshotApplied {
            discussion_id,
            applied: outcome.applied,
            skipped: outcome.skipped,
        });
        Ok(outcome)
    }
}
