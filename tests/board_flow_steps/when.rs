//! When steps for board BDD scenarios.

use super::world_defs::{BoardWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::when;
use taskboard::board::domain::{TaskId, UserId};
use taskboard::board::services::{DropTarget, NewTask};

fn drop_task(world: &mut BoardWorld, user: i64, id: i64, key: Option<&str>) -> Result<(), eyre::Report> {
    let target = DropTarget::from_column_key(key).wrap_err("resolve drop target")?;
    let ticket = world
        .services
        .drag
        .begin_drag(TaskId::new(id))
        .wrap_err("begin drag")?;
    let result = run_async(world.services.drag.complete_drop(
        ticket,
        target,
        Some(UserId::new(user)),
    ));
    world.last_drop = Some(result);
    Ok(())
}

#[when(r#"user {user:i64} drags task {id:i64} into the "{column}" column"#)]
fn drag_into_column(
    world: &mut BoardWorld,
    user: i64,
    id: i64,
    column: String,
) -> Result<(), eyre::Report> {
    drop_task(world, user, id, Some(&column))
}

#[when("user {user:i64} drops task {id:i64} outside any column")]
fn drop_outside(world: &mut BoardWorld, user: i64, id: i64) -> Result<(), eyre::Report> {
    drop_task(world, user, id, None)
}

#[when(r#"user {sender:i64} creates the task "{title}" assigned to user {assignee:i64}"#)]
fn create_task(
    world: &mut BoardWorld,
    sender: i64,
    title: String,
    assignee: i64,
) -> Result<(), eyre::Report> {
    let created = run_async(world.services.binding.create_task_with_message(
        world.discussion_id,
        NewTask::new(title).with_assignees([UserId::new(assignee)]),
        UserId::new(sender),
    ))
    .wrap_err("create task with message")?;
    world.created = Some(created);
    Ok(())
}
