//! Adapters for the board ports.
//!
//! - [`http::HttpBoardGateway`]: REST client for the board endpoints
//! - [`memory::InMemoryBoardGateway`]: thread-safe in-memory server used by
//!   tests and demos
//! - [`memory::RecordingNotifier`] and [`TracingNotifier`]: notice sinks

pub mod http;
pub mod memory;

use super::ports::{Notice, NoticeLevel, Notifier};
use tracing::{info, warn};

/// Notifier that writes notices to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        let task_id = notice.task_id.map(|id| id.value());
        match notice.level {
            NoticeLevel::Info => info!(task_id, "{}", notice.message),
            NoticeLevel::Failure => warn!(task_id, "{}", notice.message),
        }
    }
}
