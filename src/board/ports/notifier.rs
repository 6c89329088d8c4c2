//! Port for user-visible notifications.

use crate::board::domain::TaskId;

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Informational.
    Info,
    /// An operation failed but the board stayed consistent.
    Failure,
}

/// A notification shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Human-readable text.
    pub message: String,
    /// Task the notice is about, if any.
    pub task_id: Option<TaskId>,
}

impl Notice {
    /// Creates a failure notice.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Failure,
            message: message.into(),
            task_id: None,
        }
    }

    /// Creates an informational notice.
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
            task_id: None,
        }
    }

    /// Attaches the task the notice is about.
    #[must_use]
    pub const fn for_task(mut self, task_id: TaskId) -> Self {
        self.task_id = Some(task_id);
        self
    }
}

/// Sink for user-visible notices (toasts).
pub trait Notifier: Send + Sync {
    /// Shows a notice. Must not block.
    fn notify(&self, notice: Notice);
}
