//! BDD scenarios for board drag-and-drop and task creation.

mod given;
mod then;
mod when;
#[path = "world.rs"]
mod world_defs;

use rstest_bdd_macros::scenario;
use world_defs::{BoardWorld, world};

#[scenario(
    path = "tests/features/board_flow.feature",
    name = "Drag a task into another column"
)]
#[tokio::test(flavor = "multi_thread")]
async fn drag_into_another_column(world: BoardWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/board_flow.feature",
    name = "Drag a task while the server is failing"
)]
#[tokio::test(flavor = "multi_thread")]
async fn drag_while_server_fails(world: BoardWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/board_flow.feature",
    name = "Drop a task outside any column"
)]
#[tokio::test(flavor = "multi_thread")]
async fn drop_outside_any_column(world: BoardWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/board_flow.feature",
    name = "Drag by a user who is not involved"
)]
#[tokio::test(flavor = "multi_thread")]
async fn drag_by_uninvolved_user(world: BoardWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/board_flow.feature",
    name = "Create a task through the discussion"
)]
#[tokio::test(flavor = "multi_thread")]
async fn create_task_through_discussion(world: BoardWorld) {
    let _ = world;
}
