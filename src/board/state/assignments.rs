//! Task-to-assignee index used for transition permission checks.

use crate::board::domain::{Task, TaskAssignment, TaskId, UserId};
use std::collections::{BTreeSet, HashMap};

/// Maps each task to the users assigned to it.
///
/// Rows come from two sources: the assignment listing endpoint and the
/// assignee sets carried by task projections. Both are merged.
#[derive(Debug, Clone, Default)]
pub struct AssignmentIndex {
    listed: HashMap<TaskId, BTreeSet<UserId>>,
    from_tasks: HashMap<TaskId, BTreeSet<UserId>>,
}

impl AssignmentIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every row that came from the assignment listing.
    pub fn replace_listing(&mut self, assignments: impl IntoIterator<Item = TaskAssignment>) {
        self.listed.clear();
        for assignment in assignments {
            self.listed
                .entry(assignment.task_id)
                .or_default()
                .insert(assignment.user_id);
        }
    }

    /// Records the assignee set carried by a task projection.
    pub fn record_task(&mut self, task: &Task) {
        self.from_tasks
            .insert(task.id(), task.assigned_user_ids().clone());
    }

    /// Forgets the projection rows of a task.
    pub fn forget_task(&mut self, task_id: TaskId) {
        self.from_tasks.remove(&task_id);
    }

    /// Returns `true` when `user` is assigned to the task.
    #[must_use]
    pub fn is_assigned(&self, task_id: TaskId, user: UserId) -> bool {
        self.listed
            .get(&task_id)
            .is_some_and(|users| users.contains(&user))
            || self
                .from_tasks
                .get(&task_id)
                .is_some_and(|users| users.contains(&user))
    }

    /// Returns every user assigned to the task.
    #[must_use]
    pub fn assignees(&self, task_id: TaskId) -> BTreeSet<UserId> {
        let listed = self.listed.get(&task_id).into_iter().flatten();
        let carried = self.from_tasks.get(&task_id).into_iter().flatten();
        listed.chain(carried).copied().collect()
    }

    /// Returns `true` when `user` may change the status of `task`: the
    /// creator and every assignee may.
    #[must_use]
    pub fn may_transition(&self, task: &Task, user: UserId) -> bool {
        task.involves(user) || self.is_assigned(task.id(), user)
    }
}
