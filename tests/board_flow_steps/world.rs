//! World state for board BDD scenarios.

use std::sync::Arc;

use eyre::eyre;
use mockable::DefaultClock;
use rstest::fixture;
use taskboard::board::adapters::memory::{InMemoryBoardGateway, RecordingNotifier};
use taskboard::board::domain::{DiscussionId, TaskId, TaskStatus};
use taskboard::board::error::BoardError;
use taskboard::board::services::{BoardServices, CreatedTaskWithMessage, DropOutcome};
use taskboard::config::BoardConfig;

pub type TestServices = BoardServices<InMemoryBoardGateway, RecordingNotifier, DefaultClock>;

/// World state for board BDD tests.
pub struct BoardWorld {
    pub gateway: Arc<InMemoryBoardGateway>,
    pub notifier: Arc<RecordingNotifier>,
    pub services: TestServices,
    pub discussion_id: DiscussionId,
    pub last_drop: Option<Result<DropOutcome, BoardError>>,
    pub created: Option<CreatedTaskWithMessage>,
}

impl Default for BoardWorld {
    fn default() -> Self {
        let gateway = Arc::new(InMemoryBoardGateway::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let services = BoardServices::new(
            &BoardConfig::default(),
            Arc::clone(&gateway),
            Arc::clone(&notifier),
            Arc::new(DefaultClock),
        );
        Self {
            gateway,
            notifier,
            services,
            discussion_id: DiscussionId::new(0),
            last_drop: None,
            created: None,
        }
    }
}

impl BoardWorld {
    /// Returns the column currently holding the task on the local board.
    pub fn column_of(&self, id: i64) -> Result<Option<TaskStatus>, eyre::Report> {
        let position = self.services.board.locate(TaskId::new(id))?;
        Ok(position.map(|found| found.status))
    }

    /// Returns the last drop result, failing when no drop was attempted.
    pub fn last_drop(&self) -> Result<&Result<DropOutcome, BoardError>, eyre::Report> {
        self.last_drop
            .as_ref()
            .ok_or_else(|| eyre!("no drop was attempted"))
    }
}

#[fixture]
pub fn world() -> BoardWorld {
    BoardWorld::default()
}

pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
