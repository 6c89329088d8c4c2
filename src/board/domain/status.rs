//! Status columns and priority levels.

use super::{ParseTaskPriorityError, ParseTaskStatusError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Workflow status of a task. Each value is one board column.
///
/// The wire representation is the variant name (`"ToDo"`, `"InReview"`, ...).
/// Numeric codes are not accepted. New tasks start in [`TaskStatus::ToDo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum TaskStatus {
    /// Not yet planned.
    Backlog,
    /// Planned and ready to start.
    #[default]
    ToDo,
    /// Being worked on.
    InProgress,
    /// Awaiting review.
    InReview,
    /// Finished.
    Done,
}

impl TaskStatus {
    /// All columns in board order.
    pub const ALL: [Self; 5] = [
        Self::Backlog,
        Self::ToDo,
        Self::InProgress,
        Self::InReview,
        Self::Done,
    ];

    /// Returns the canonical wire tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Backlog => "Backlog",
            Self::ToDo => "ToDo",
            Self::InProgress => "InProgress",
            Self::InReview => "InReview",
            Self::Done => "Done",
        }
    }

    /// Zero-based position of the column on the board.
    #[must_use]
    pub const fn column_index(self) -> usize {
        match self {
            Self::Backlog => 0,
            Self::ToDo => 1,
            Self::InProgress => 2,
            Self::InReview => 3,
            Self::Done => 4,
        }
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseTaskStatusError(value.to_owned()))
    }
}

impl FromStr for TaskStatus {
    type Err = ParseTaskStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum TaskPriority {
    /// Can wait.
    Low,
    /// Default priority.
    #[default]
    Medium,
    /// Needs attention first.
    High,
}

impl TaskPriority {
    /// Returns the canonical wire tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl TryFrom<&str> for TaskPriority {
    type Error = ParseTaskPriorityError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        [Self::Low, Self::Medium, Self::High]
            .into_iter()
            .find(|priority| priority.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseTaskPriorityError(value.to_owned()))
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
