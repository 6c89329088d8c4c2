//! Given steps for board BDD scenarios.

use super::world_defs::{BoardWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use taskboard::board::adapters::memory::Endpoint;
use taskboard::board::domain::{
    DirectoryUser, DiscussionId, Task, TaskData, TaskId, TaskStatus, UserId,
};

#[given("a board for discussion {discussion:i64} with users {first:i64} and {second:i64}")]
fn board_with_users(
    world: &mut BoardWorld,
    discussion: i64,
    first: i64,
    second: i64,
) -> Result<(), eyre::Report> {
    world.discussion_id = DiscussionId::new(discussion);
    world.gateway.set_users([first, second].map(|id| DirectoryUser {
        id: UserId::new(id),
        display_name: format!("user {id}"),
    }));
    Ok(())
}

#[given(r#"a task {id:i64} created by user {creator:i64} in "{status}""#)]
fn task_in_column(
    world: &mut BoardWorld,
    id: i64,
    creator: i64,
    status: String,
) -> Result<(), eyre::Report> {
    let column: TaskStatus = status.parse().wrap_err("parse column")?;
    world.gateway.insert_task(Task::from_data(
        TaskData::new(
            TaskId::new(id),
            format!("Task {id}"),
            UserId::new(creator),
            world.discussion_id,
        )
        .with_status(column),
    ));
    run_async(world.services.sync.refresh(world.discussion_id)).wrap_err("load board")?;
    Ok(())
}

#[given("the server rejects status updates")]
fn server_rejects_status_updates(world: &mut BoardWorld) -> Result<(), eyre::Report> {
    world.gateway.fail(Endpoint::UpdateStatus);
    Ok(())
}
