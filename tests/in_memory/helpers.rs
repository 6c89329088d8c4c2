//! Shared fixtures for in-memory board integration tests.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::{Clock, DefaultClock};
use rstest::fixture;
use taskboard::board::adapters::memory::{InMemoryBoardGateway, RecordingNotifier};
use taskboard::board::domain::{
    DirectoryUser, DiscussionId, Task, TaskData, TaskId, TaskStatus, UserId,
};
use taskboard::board::services::BoardServices;
use taskboard::config::BoardConfig;

pub const DISCUSSION: DiscussionId = DiscussionId::new(3);
pub const CREATOR: UserId = UserId::new(1);
pub const ASSIGNEE: UserId = UserId::new(2);

/// Clock pinned to one instant, for a server running behind its clients.
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Returns a fixed instant well before any real client clock reading.
pub fn early_morning() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 1, 6, 9, 0, 0)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH)
}

pub type TestServices = BoardServices<InMemoryBoardGateway, RecordingNotifier, DefaultClock>;

/// One client connected to a shared in-memory server.
pub struct Client {
    pub notifier: Arc<RecordingNotifier>,
    pub services: TestServices,
}

impl Client {
    /// Connects a new client with its own board to `gateway`.
    pub fn connect(gateway: &Arc<InMemoryBoardGateway>) -> Self {
        let notifier = Arc::new(RecordingNotifier::new());
        let services = BoardServices::new(
            &BoardConfig::default(),
            Arc::clone(gateway),
            Arc::clone(&notifier),
            Arc::new(DefaultClock),
        );
        Self { notifier, services }
    }

    /// Returns the column holding `id` on this client's board.
    ///
    /// # Errors
    ///
    /// Returns an error if the board lock is poisoned.
    pub fn column_of(&self, id: TaskId) -> Result<Option<TaskStatus>, eyre::Report> {
        let position = self.services.board.locate(id)?;
        Ok(position.map(|found| found.status))
    }
}

/// Builds a task owned by [`CREATOR`] and assigned to [`ASSIGNEE`].
pub fn task(id: i64, status: TaskStatus) -> Task {
    Task::from_data(
        TaskData::new(TaskId::new(id), format!("Task {id}"), CREATOR, DISCUSSION)
            .with_status(status)
            .with_assignees([ASSIGNEE]),
    )
}

/// Provides a server holding two users and tasks 7 (`ToDo`) and 9
/// (`InReview`).
#[fixture]
pub fn gateway() -> Arc<InMemoryBoardGateway> {
    let gateway = Arc::new(InMemoryBoardGateway::new());
    gateway.set_users([(CREATOR, "Ada"), (ASSIGNEE, "Grace")].map(|(id, name)| {
        DirectoryUser {
            id,
            display_name: name.to_owned(),
        }
    }));
    gateway.insert_task(task(7, TaskStatus::ToDo));
    gateway.insert_task(task(9, TaskStatus::InReview));
    gateway
}
