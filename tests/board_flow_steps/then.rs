//! Then steps for board BDD scenarios.

use super::world_defs::BoardWorld;
use eyre::{WrapErr, ensure, eyre};
use rstest_bdd_macros::then;
use taskboard::board::adapters::memory::Endpoint;
use taskboard::board::domain::{TaskPriority, TaskStatus};
use taskboard::board::error::BoardError;

#[then(r#"task {id:i64} is in the "{column}" column"#)]
fn task_is_in_column(world: &BoardWorld, id: i64, column: String) -> Result<(), eyre::Report> {
    let expected: TaskStatus = column.parse().wrap_err("parse column")?;
    let actual = world.column_of(id)?;
    ensure!(
        actual == Some(expected),
        "expected task {id} in {expected}, found {actual:?}"
    );
    Ok(())
}

#[then(r#"task {id:i64} is not in the "{column}" column"#)]
fn task_is_not_in_column(world: &BoardWorld, id: i64, column: String) -> Result<(), eyre::Report> {
    let status: TaskStatus = column.parse().wrap_err("parse column")?;
    let ids = world.services.board.column_ids(status)?;
    ensure!(
        ids.iter().all(|task_id| task_id.value() != id),
        "task {id} is still listed in {status}"
    );
    Ok(())
}

#[then("no failure notice was shown")]
fn no_failure_notice(world: &BoardWorld) -> Result<(), eyre::Report> {
    let failures = world.notifier.failures();
    ensure!(failures.is_empty(), "unexpected failure notices: {failures:?}");
    Ok(())
}

#[then("a failure notice was shown")]
fn failure_notice(world: &BoardWorld) -> Result<(), eyre::Report> {
    let count = world.notifier.failures().len();
    ensure!(count == 1, "expected one failure notice, found {count}");
    Ok(())
}

#[then("the server received no status update")]
fn no_status_update(world: &BoardWorld) -> Result<(), eyre::Report> {
    let count = world.gateway.call_count(Endpoint::UpdateStatus);
    ensure!(count == 0, "server received {count} status updates");
    Ok(())
}

#[then("the drop fails with a permission error")]
fn drop_denied(world: &BoardWorld) -> Result<(), eyre::Report> {
    match world.last_drop()? {
        Err(BoardError::PermissionDenied { .. }) => Ok(()),
        other => Err(eyre!("expected permission error, got {other:?}")),
    }
}

#[then(r#"the created task is in the "{column}" column with priority "{priority}""#)]
fn created_task_defaults(
    world: &BoardWorld,
    column: String,
    priority: String,
) -> Result<(), eyre::Report> {
    let created = world
        .created
        .as_ref()
        .ok_or_else(|| eyre!("no task was created"))?;
    let status: TaskStatus = column.parse().wrap_err("parse column")?;
    let expected_priority =
        TaskPriority::try_from(priority.as_str()).wrap_err("parse priority")?;
    ensure!(created.task.status() == status, "created task is in {}", created.task.status());
    ensure!(
        created.task.priority() == expected_priority,
        "created task has priority {}",
        created.task.priority()
    );
    let ids = world.services.board.column_ids(status)?;
    ensure!(
        ids.contains(&created.task.id()),
        "created task is missing from {status}"
    );
    Ok(())
}

#[then("the created message references the created task")]
fn created_message_references_task(world: &BoardWorld) -> Result<(), eyre::Report> {
    let created = world
        .created
        .as_ref()
        .ok_or_else(|| eyre!("no task was created"))?;
    ensure!(
        created.message.task_id() == Some(created.task.id()),
        "message {} does not reference task {}",
        created.message.id(),
        created.task.id()
    );
    let messages = world.services.board.messages(world.discussion_id)?;
    ensure!(
        messages.contains(&created.message),
        "created message is missing from the discussion"
    );
    Ok(())
}
