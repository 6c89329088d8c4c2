//! Notifier that keeps every notice for later inspection.

use crate::board::ports::{Notice, NoticeLevel, Notifier};
use std::sync::{Mutex, PoisonError};

/// Records notices in arrival order.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every notice received so far.
    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns only the failure notices.
    #[must_use]
    pub fn failures(&self) -> Vec<Notice> {
        self.notices()
            .into_iter()
            .filter(|notice| notice.level == NoticeLevel::Failure)
            .collect()
    }

    /// Forgets every recorded notice.
    pub fn clear(&self) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice);
    }
}
