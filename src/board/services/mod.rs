//! Application services for the task board.

mod binding;
mod drag;
mod edit;
mod pending;
mod poller;
mod sync;
mod transition;

pub use binding::{CreatedTaskWithMessage, NewTask, TaskMessageBinding};
pub use drag::{DragReorderController, DragTicket, DropOutcome, DropTarget};
pub use edit::TaskEditor;
pub use poller::MessagePoller;
pub use sync::BoardSync;
pub use transition::{StatusTransitionEngine, TransitionOutcome, TransitionRequest};

use super::ports::{BoardGateway, Notifier};
use super::state::Board;
use crate::config::BoardConfig;
use mockable::Clock;
use std::sync::Arc;

/// Every board service wired to one shared board.
pub struct BoardServices<G, N, C>
where
    G: BoardGateway + 'static,
    N: Notifier + 'static,
    C: Clock + Send + Sync,
{
    /// Shared state read by the render layer.
    pub board: Board,
    /// Status transitions.
    pub transitions: Arc<StatusTransitionEngine<G, N>>,
    /// Drag-and-drop.
    pub drag: DragReorderController<G, N>,
    /// Combined task and message creation.
    pub binding: TaskMessageBinding<G, N>,
    /// Field edits.
    pub editor: TaskEditor<G, N, C>,
    /// On-demand refresh.
    pub sync: Arc<BoardSync<G, N>>,
    /// Interval refresh of the selected discussion.
    pub poller: MessagePoller<G, N>,
}

impl<G, N, C> BoardServices<G, N, C>
where
    G: BoardGateway + 'static,
    N: Notifier + 'static,
    C: Clock + Send + Sync,
{
    /// Wires the services around a fresh board.
    #[must_use]
    pub fn new(config: &BoardConfig, gateway: Arc<G>, notifier: Arc<N>, clock: Arc<C>) -> Self {
        let board = Board::new();
        let transitions = Arc::new(StatusTransitionEngine::new(
            board.clone(),
            Arc::clone(&gateway),
            Arc::clone(&notifier),
        ));
        let sync = Arc::new(BoardSync::new(
            board.clone(),
            Arc::clone(&gateway),
            Arc::clone(&notifier),
        ));
        Self {
            drag: DragReorderController::new(Arc::clone(&transitions)),
            binding: TaskMessageBinding::new(
                board.clone(),
                Arc::clone(&gateway),
                Arc::clone(&notifier),
            ),
            editor: TaskEditor::new(board.clone(), gateway, notifier, clock),
            poller: MessagePoller::new(Arc::clone(&sync), config.poll_interval()),
            transitions,
            sync,
            board,
        }
    }
}
