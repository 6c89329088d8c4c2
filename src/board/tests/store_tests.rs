//! Tests for column membership and snapshot reconciliation.

use super::fixtures::{DISCUSSION, at, task};
use crate::board::domain::{DiscussionId, Task, TaskData, TaskId, TaskStatus, UserId};
use crate::board::state::{ColumnPosition, TaskStore};
use rstest::{fixture, rstest};

#[fixture]
fn store() -> TaskStore {
    let mut store = TaskStore::new();
    store.upsert(task(1, TaskStatus::ToDo));
    store.upsert(task(2, TaskStatus::ToDo));
    store.upsert(task(3, TaskStatus::InProgress));
    store
}

fn ids(values: &[i64]) -> Vec<TaskId> {
    values.iter().copied().map(TaskId::new).collect()
}

#[rstest]
fn upsert_places_each_task_in_its_status_column(store: TaskStore) {
    assert_eq!(store.len(), 3);
    assert_eq!(store.column_ids(TaskStatus::ToDo), ids(&[1, 2]).as_slice());
    assert_eq!(store.column_ids(TaskStatus::InProgress), ids(&[3]).as_slice());
    assert!(store.column_ids(TaskStatus::Done).is_empty());
    assert!(store.is_consistent());
}

#[rstest]
fn move_appends_to_the_end_of_the_target_column(mut store: TaskStore) {
    let moved = store
        .move_to(TaskId::new(1), TaskStatus::InProgress)
        .map(Task::status);

    assert_eq!(moved, Some(TaskStatus::InProgress));
    assert_eq!(store.column_ids(TaskStatus::ToDo), ids(&[2]).as_slice());
    assert_eq!(store.column_ids(TaskStatus::InProgress), ids(&[3, 1]).as_slice());
    assert!(store.is_consistent());
}

#[rstest]
fn move_of_unknown_task_changes_nothing(mut store: TaskStore) {
    let generation = store.generation();
    assert!(store.move_to(TaskId::new(42), TaskStatus::Done).is_none());
    assert_eq!(store.generation(), generation);
}

#[rstest]
fn restore_puts_the_task_back_at_its_old_index(mut store: TaskStore) {
    let checkpoint = store.checkpoint(TaskId::new(1)).expect("task 1 is stored");
    assert_eq!(
        checkpoint.position(),
        ColumnPosition {
            status: TaskStatus::ToDo,
            index: 0
        }
    );

    store.move_to(TaskId::new(1), TaskStatus::Done);
    store.restore(checkpoint);

    assert_eq!(store.column_ids(TaskStatus::ToDo), ids(&[1, 2]).as_slice());
    assert!(store.column_ids(TaskStatus::Done).is_empty());
    assert_eq!(
        store.task(TaskId::new(1)).map(Task::status),
        Some(TaskStatus::ToDo)
    );
    assert!(store.is_consistent());
}

#[rstest]
fn upsert_in_same_column_keeps_position(mut store: TaskStore) {
    let renamed = Task::from_data(
        TaskData::new(TaskId::new(1), "Renamed", UserId::new(1), DISCUSSION)
            .with_status(TaskStatus::ToDo),
    );
    store.upsert(renamed);
    assert_eq!(store.column_ids(TaskStatus::ToDo), ids(&[1, 2]).as_slice());
    assert_eq!(store.task(TaskId::new(1)).map(Task::title), Some("Renamed"));
}

#[rstest]
fn snapshot_orders_new_rows_by_sort_order() {
    let mut store = TaskStore::new();
    let rows = [(10, 2), (11, 0), (12, 1)]
        .into_iter()
        .map(|(id, order)| {
            Task::from_data(
                TaskData::new(TaskId::new(id), "row", UserId::new(1), DISCUSSION)
                    .with_sort_order(order),
            )
        })
        .collect();

    let outcome = store.apply_snapshot(DISCUSSION, rows, store.generation());

    assert_eq!(outcome.applied, 3);
    assert_eq!(store.column_ids(TaskStatus::ToDo), ids(&[11, 12, 10]).as_slice());
}

#[rstest]
fn snapshot_skips_rows_written_after_the_request_started(mut store: TaskStore) {
    let since = store.generation();
    store.move_to(TaskId::new(1), TaskStatus::Done);

    let stale = vec![task(1, TaskStatus::ToDo), task(2, TaskStatus::ToDo), task(3, TaskStatus::InProgress)];
    let outcome = store.apply_snapshot(DISCUSSION, stale, since);

    assert_eq!(outcome.skipped, 1);
    assert_eq!(
        store.task(TaskId::new(1)).map(Task::status),
        Some(TaskStatus::Done)
    );
    assert!(store.is_consistent());
}

#[rstest]
fn snapshot_skips_rows_with_a_change_in_flight(mut store: TaskStore) {
    assert!(store.begin_in_flight(TaskId::new(2)));
    assert!(!store.begin_in_flight(TaskId::new(2)));
    let since = store.generation();

    let incoming = vec![
        task(1, TaskStatus::ToDo),
        task(2, TaskStatus::Done),
        task(3, TaskStatus::InProgress),
    ];
    let outcome = store.apply_snapshot(DISCUSSION, incoming, since);

    assert_eq!(outcome.skipped, 1);
    assert_eq!(
        store.task(TaskId::new(2)).map(Task::status),
        Some(TaskStatus::ToDo)
    );
}

#[rstest]
fn snapshot_skips_rows_older_than_the_local_copy() {
    let mut store = TaskStore::new();
    let local = Task::from_data(
        TaskData::new(TaskId::new(5), "local", UserId::new(1), DISCUSSION)
            .with_status(TaskStatus::Done)
            .with_updated_at(at(10)),
    );
    store.apply_snapshot(DISCUSSION, vec![local], store.generation());

    let older = Task::from_data(
        TaskData::new(TaskId::new(5), "older", UserId::new(1), DISCUSSION)
            .with_status(TaskStatus::ToDo)
            .with_updated_at(at(2)),
    );
    let outcome = store.apply_snapshot(DISCUSSION, vec![older], store.generation());

    assert_eq!(outcome.skipped, 1);
    assert_eq!(store.task(TaskId::new(5)).map(Task::title), Some("local"));
}

#[rstest]
fn snapshot_applies_remote_moves_and_removals(mut store: TaskStore) {
    let since = store.generation();
    let incoming = vec![task(1, TaskStatus::InReview), task(3, TaskStatus::InProgress)];

    let outcome = store.apply_snapshot(DISCUSSION, incoming, since);

    assert_eq!(outcome.applied, 2);
    assert_eq!(outcome.removed, 1);
    assert!(store.task(TaskId::new(2)).is_none());
    assert_eq!(store.column_ids(TaskStatus::InReview), ids(&[1]).as_slice());
    assert!(store.is_consistent());
}

#[rstest]
fn snapshot_keeps_tasks_written_locally_even_if_not_listed(mut store: TaskStore) {
    let since = store.generation();
    store.upsert(task(4, TaskStatus::Backlog));

    let outcome = store.apply_snapshot(DISCUSSION, vec![task(1, TaskStatus::ToDo)], since);

    assert!(store.task(TaskId::new(4)).is_some());
    assert_eq!(outcome.removed, 2);
}

#[rstest]
fn snapshot_leaves_other_discussions_alone(mut store: TaskStore) {
    let other = DiscussionId::new(99);
    let outcome = store.apply_snapshot(other, Vec::new(), store.generation());
    assert_eq!(outcome.removed, 0);
    assert_eq!(store.len(), 3);
}
