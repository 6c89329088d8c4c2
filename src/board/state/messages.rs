//! Chronological message lists per discussion.

use crate::board::domain::{DiscussionId, DiscussionMessage, Task, TaskId};
use std::collections::HashMap;

/// Messages of every loaded discussion, oldest first.
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    by_discussion: HashMap<DiscussionId, Vec<DiscussionMessage>>,
}

impl MessageLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a discussion's messages, oldest first.
    #[must_use]
    pub fn messages(&self, discussion_id: DiscussionId) -> &[DiscussionMessage] {
        self.by_discussion
            .get(&discussion_id)
            .map_or(&[], Vec::as_slice)
    }

    /// Finds the task-typed message correlated with a task.
    #[must_use]
    pub fn message_for_task(&self, task_id: TaskId) -> Option<&DiscussionMessage> {
        self.by_discussion
            .values()
            .flatten()
            .find(|message| message.task_id() == Some(task_id))
    }

    /// Appends a message, keeping chronological order.
    ///
    /// A message whose id is already present replaces the existing entry.
    pub fn append(&mut self, message: DiscussionMessage) {
        let list = self.by_discussion.entry(message.discussion_id()).or_default();
        if let Some(existing) = list.iter_mut().find(|entry| entry.id() == message.id()) {
            *existing = message;
            return;
        }
        let index = list.partition_point(|entry| entry.sent_at() <= message.sent_at());
        list.insert(index, message);
    }

    /// Replaces a discussion's message list with a server listing.
    ///
    /// Local messages missing from the listing survive only if `keep`
    /// accepts them.
    pub fn replace_discussion(
        &mut self,
        discussion_id: DiscussionId,
        mut messages: Vec<DiscussionMessage>,
        keep: impl Fn(&DiscussionMessage) -> bool,
    ) {
        messages.retain(|message| message.discussion_id() == discussion_id);
        if let Some(previous) = self.by_discussion.remove(&discussion_id) {
            let survivors: Vec<DiscussionMessage> = previous
                .into_iter()
                .filter(|old| !messages.iter().any(|new| new.id() == old.id()) && keep(old))
                .collect();
            messages.extend(survivors);
        }
        messages.sort_by_key(DiscussionMessage::sent_at);
        self.by_discussion.insert(discussion_id, messages);
    }

    /// Rewrites the snapshot of the message correlated with `task` so that it
    /// renders the task's current fields.
    ///
    /// Returns `true` when a snapshot changed.
    pub fn sync_task(&mut self, task: &Task) -> bool {
        self.by_discussion
            .get_mut(&task.discussion_id())
            .into_iter()
            .flatten()
            .fold(false, |changed, message| message.refresh_snapshot(task) || changed)
    }
}
