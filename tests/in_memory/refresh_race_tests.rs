//! Refreshes racing optimistic changes that are still awaiting the server.

use std::sync::Arc;
use std::time::Duration;

use rstest::rstest;
use taskboard::board::adapters::memory::{Endpoint, InMemoryBoardGateway};
use taskboard::board::domain::{TaskId, TaskStatus};
use taskboard::board::error::BoardError;
use taskboard::board::services::TransitionRequest;

use super::helpers::{ASSIGNEE, Client, DISCUSSION, gateway};

const LATENCY: Duration = Duration::from_millis(150);
const TASK: TaskId = TaskId::new(7);

async fn loaded_client(gateway: &Arc<InMemoryBoardGateway>) -> Result<Client, eyre::Report> {
    let client = Client::connect(gateway);
    client.services.sync.refresh(DISCUSSION).await?;
    gateway.set_latency(LATENCY);
    Ok(client)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn refresh_during_a_move_does_not_revert_it(
    gateway: Arc<InMemoryBoardGateway>,
) -> Result<(), eyre::Report> {
    let client = loaded_client(&gateway).await?;
    let engine = Arc::clone(&client.services.transitions);
    let moving = tokio::spawn(async move {
        engine
            .transition(TransitionRequest::new(TASK, "InReview").acting_as(ASSIGNEE))
            .await
    });
    tokio::time::sleep(Duration::from_millis(20)).await;
    eyre::ensure!(
        client.column_of(TASK)? == Some(TaskStatus::InReview),
        "optimistic move is not visible"
    );

    let refreshed = client.services.sync.refresh(DISCUSSION).await?;
    moving.await??;

    eyre::ensure!(refreshed.skipped >= 1, "stale row was not skipped");
    eyre::ensure!(
        client.column_of(TASK)? == Some(TaskStatus::InReview),
        "refresh reverted the move"
    );
    eyre::ensure!(
        client.services.board.column_ids(TaskStatus::InReview)?
            == vec![TaskId::new(9), TASK],
        "moved task is not at the end of its column"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn second_change_while_the_first_is_pending_is_rejected(
    gateway: Arc<InMemoryBoardGateway>,
) -> Result<(), eyre::Report> {
    let client = loaded_client(&gateway).await?;
    let engine = Arc::clone(&client.services.transitions);
    let moving = tokio::spawn(async move {
        engine
            .transition(TransitionRequest::new(TASK, "InProgress").acting_as(ASSIGNEE))
            .await
    });
    tokio::time::sleep(Duration::from_millis(20)).await;

    let second = client
        .services
        .transitions
        .transition(TransitionRequest::new(TASK, "Done").acting_as(ASSIGNEE))
        .await;
    moving.await??;

    eyre::ensure!(
        matches!(second, Err(BoardError::ChangeInFlight(id)) if id == TASK),
        "expected the second change to be rejected, got {second:?}"
    );
    eyre::ensure!(
        client.column_of(TASK)? == Some(TaskStatus::InProgress),
        "first change did not land"
    );
    eyre::ensure!(
        gateway.call_count(Endpoint::UpdateStatus) == 1,
        "rejected change reached the server"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_move_is_restored_even_if_a_refresh_lands_first(
    gateway: Arc<InMemoryBoardGateway>,
) -> Result<(), eyre::Report> {
    let client = loaded_client(&gateway).await?;
    gateway.fail_once(Endpoint::UpdateStatus);
    let engine = Arc::clone(&client.services.transitions);
    let moving = tokio::spawn(async move {
        engine
            .transition(TransitionRequest::new(TASK, "Done").acting_as(ASSIGNEE))
            .await
    });
    tokio::time::sleep(Duration::from_millis(20)).await;

    client.services.sync.refresh(DISCUSSION).await?;
    let result = moving.await?;

    eyre::ensure!(
        result.as_ref().is_err_and(BoardError::is_network_failure),
        "expected the move to fail, got {result:?}"
    );
    eyre::ensure!(
        client.column_of(TASK)? == Some(TaskStatus::ToDo),
        "failed move was not rolled back"
    );
    eyre::ensure!(
        client.notifier.failures().len() == 1,
        "expected one failure notice"
    );
    Ok(())
}
