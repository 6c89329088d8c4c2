//! Interval refresh of the selected discussion.

use super::sync::BoardSync;
use crate::board::domain::DiscussionId;
use crate::board::ports::{BoardGateway, Notifier};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

struct ActivePoll {
    discussion_id: DiscussionId,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl ActivePoll {
    fn stop(self) {
        self.cancel.cancel();
        self.handle.abort();
        info!(discussion_id = %self.discussion_id, "stopped polling discussion");
    }
}

/// Refreshes the selected discussion on a fixed interval.
///
/// At most one discussion is polled. Changing or clearing the selection, or
/// dropping the poller, cancels the running loop together with any fetch it
/// has in flight.
pub struct MessagePoller<G, N>
where
    G: BoardGateway + 'static,
    N: Notifier + 'static,
{
    sync: Arc<BoardSync<G, N>>,
    interval: Duration,
    active: Option<ActivePoll>,
}

impl<G, N> MessagePoller<G, N>
where
    G: BoardGateway + 'static,
    N: Notifier + 'static,
{
    /// Creates an idle poller.
    #[must_use]
    pub const fn new(sync: Arc<BoardSync<G, N>>, interval: Duration) -> Self {
        Self {
            sync,
            interval,
            active: None,
        }
    }

    /// Returns the discussion currently polled.
    #[must_use]
    pub fn current(&self) -> Option<DiscussionId> {
        self.active.as_ref().map(|poll| poll.discussion_id)
    }

    /// Returns `true` while a polling loop is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|poll| !poll.handle.is_finished())
    }

    /// Changes the selected discussion.
    ///
    /// The previous loop is stopped before a new one starts. Selecting the
    /// discussion already polled keeps the running loop.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime, as [`tokio::spawn`] does.
    pub fn select(&mut self, discussion_id: Option<DiscussionId>) {
        if discussion_id.is_some() && discussion_id == self.current() {
            return;
        }
        self.stop();
        if let Some(id) = discussion_id {
            self.active = Some(self.spawn(id));
        }
    }

    /// Stops polling.
    pub fn stop(&mut self) {
        if let Some(poll) = self.active.take() {
            poll.stop();
        }
    }

    fn spawn(&self, discussion_id: DiscussionId) -> ActivePoll {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let sync = Arc::clone(&self.sync);
        let interval = self.interval;
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    result = sync.refresh(discussion_id) => {
                        if let Err(err) = result {
                            debug!(discussion_id = %discussion_id, error = %err, "poll round failed");
                        }
                    }
                }
            }
        });
        info!(discussion_id = %discussion_id, interval = ?interval, "started polling discussion");
        ActivePoll {
            discussion_id,
            cancel,
            handle,
        }
    }
}

impl<G, N> Drop for MessagePoller<G, N>
where
    G: BoardGateway + 'static,
    N: Notifier + 'static,
{
    fn drop(&mut self) {
        self.stop();
    }
}
