//! Committed board changes published to subscribers.

use crate::board::domain::{DiscussionId, MessageId, TaskId, TaskStatus};

/// A change to the board that the render layer should pick up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardEvent {
    /// A task changed column.
    TaskMoved {
        /// Moved task.
        task_id: TaskId,
        /// Previous column.
        from: TaskStatus,
        /// New column.
        to: TaskStatus,
    },
    /// A change the server rejected was undone.
    ChangeRolledBack {
        /// Affected task.
        task_id: TaskId,
        /// Column the task is back in.
        restored: TaskStatus,
    },
    /// A task and its message were created.
    TaskCreated {
        /// New task.
        task_id: TaskId,
        /// Correlated message.
        message_id: MessageId,
    },
    /// Task fields changed.
    TaskUpdated {
        /// Updated task.
        task_id: TaskId,
    },
    /// A server snapshot was reconciled into the board.
    SnapshotApplied {
        /// Refreshed discussion.
        discussion_id: DiscussionId,
        /// Rows taken from the server.
        applied: usize,
        /// Rows ignored as stale.
        skipped: usize,
    },
}
