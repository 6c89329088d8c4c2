//! End-to-end flows of several clients sharing one server.

use std::collections::BTreeSet;
use std::sync::Arc;

use rstest::rstest;
use taskboard::board::adapters::memory::{CreationFault, Endpoint, InMemoryBoardGateway};
use taskboard::board::domain::{ClientRequestId, TaskId, TaskPatch, TaskPriority, TaskStatus};
use taskboard::board::error::BoardError;
use taskboard::board::ports::{BoardGateway, CreateTaskWithMessage};
use taskboard::board::services::{NewTask, TransitionRequest};

use super::helpers::{
    ASSIGNEE, CREATOR, Client, DISCUSSION, FixedClock, early_morning, gateway, task,
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn move_by_one_client_reaches_another_on_refresh(
    gateway: Arc<InMemoryBoardGateway>,
) -> Result<(), eyre::Report> {
    let alice = Client::connect(&gateway);
    let bob = Client::connect(&gateway);
    alice.services.sync.refresh(DISCUSSION).await?;
    bob.services.sync.refresh(DISCUSSION).await?;

    alice
        .services
        .transitions
        .transition(TransitionRequest::new(TaskId::new(7), "Done").acting_as(ASSIGNEE))
        .await?;
    eyre::ensure!(
        bob.column_of(TaskId::new(7))? == Some(TaskStatus::ToDo),
        "bob sees the move before refreshing"
    );

    bob.services.sync.refresh(DISCUSSION).await?;
    eyre::ensure!(
        bob.column_of(TaskId::new(7))? == Some(TaskStatus::Done),
        "bob does not see the move after refreshing"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn created_task_and_message_reach_other_clients(
    gateway: Arc<InMemoryBoardGateway>,
) -> Result<(), eyre::Report> {
    let alice = Client::connect(&gateway);
    let bob = Client::connect(&gateway);

    let created = alice
        .services
        .binding
        .create_task_with_message(
            DISCUSSION,
            NewTask::new("Review doc").with_assignees([ASSIGNEE]),
            CREATOR,
        )
        .await?;
    bob.services.sync.refresh(DISCUSSION).await?;

    eyre::ensure!(
        bob.column_of(created.task.id())? == Some(TaskStatus::ToDo),
        "created task missing from bob's ToDo column"
    );
    let messages = bob.services.board.messages(DISCUSSION)?;
    eyre::ensure!(
        messages
            .iter()
            .any(|message| message.task_id() == Some(created.task.id())),
        "task message missing from bob's discussion"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn retried_creation_request_creates_one_task(
    gateway: Arc<InMemoryBoardGateway>,
) -> Result<(), eyre::Report> {
    let request = CreateTaskWithMessage {
        request_id: ClientRequestId::new(),
        discussion_id: DISCUSSION,
        sender_id: CREATOR,
        content: "Review doc".to_owned(),
        title: "Review doc".to_owned(),
        description: String::new(),
        status: TaskStatus::ToDo,
        priority: TaskPriority::Medium,
        due_date: None,
        estimated_time: None,
        assigned_user_ids: BTreeSet::from([ASSIGNEE]),
        client_id: None,
        project_id: None,
        attachment: None,
    };

    let first = gateway.create_task_with_message(request.clone()).await?;
    let second = gateway.create_task_with_message(request).await?;

    eyre::ensure!(first == second, "retry produced a different reply");
    let listed = gateway.load_board(DISCUSSION).await?;
    eyre::ensure!(listed.len() == 3, "expected three tasks, found {}", listed.len());
    Ok(())
}

#[rstest]
#[case(CreationFault::MissingTask)]
#[case(CreationFault::MissingMessage)]
#[case(CreationFault::MismatchedMessage)]
#[tokio::test(flavor = "multi_thread")]
async fn malformed_creation_reply_is_recovered_by_refresh(
    gateway: Arc<InMemoryBoardGateway>,
    #[case] fault: CreationFault,
) -> Result<(), eyre::Report> {
    let client = Client::connect(&gateway);
    gateway.corrupt_next_creation(fault);

    let result = client
        .services
        .binding
        .create_task_with_message(DISCUSSION, NewTask::new("Review doc"), CREATOR)
        .await;
    eyre::ensure!(
        matches!(result, Err(BoardError::IncompleteCreation(_))),
        "expected an incomplete creation, got {result:?}"
    );
    eyre::ensure!(
        client.services.board.column_ids(TaskStatus::ToDo)?.is_empty(),
        "half a creation reached the board"
    );

    client.services.sync.refresh(DISCUSSION).await?;
    let todo = client.services.board.column(TaskStatus::ToDo)?;
    eyre::ensure!(
        todo.iter().any(|task| task.title() == "Review doc"),
        "refresh did not bring in the created task"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn edited_fields_survive_a_refresh(
    gateway: Arc<InMemoryBoardGateway>,
) -> Result<(), eyre::Report> {
    let client = Client::connect(&gateway);
    client.services.sync.refresh(DISCUSSION).await?;

    client
        .services
        .editor
        .update_fields(
            TaskId::new(9),
            TaskPatch::new()
                .with_title("Ship the release")?
                .with_priority(TaskPriority::High),
        )
        .await?;
    client.services.sync.refresh(DISCUSSION).await?;

    let task = client
        .services
        .board
        .task(TaskId::new(9))?
        .ok_or_else(|| eyre::eyre!("task 9 vanished"))?;
    eyre::ensure!(task.title() == "Ship the release", "title was {}", task.title());
    eyre::ensure!(task.priority() == TaskPriority::High, "priority was {}", task.priority());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn refresh_failure_keeps_the_board_and_notifies(
    gateway: Arc<InMemoryBoardGateway>,
) -> Result<(), eyre::Report> {
    let client = Client::connect(&gateway);
    client.services.sync.refresh(DISCUSSION).await?;
    gateway.fail_once(Endpoint::ListAssignments);
    gateway.remove_task(TaskId::new(7));

    let result = client.services.sync.refresh(DISCUSSION).await;

    eyre::ensure!(
        result.as_ref().is_err_and(BoardError::is_network_failure),
        "expected a network failure, got {result:?}"
    );
    eyre::ensure!(
        client.column_of(TaskId::new(7))? == Some(TaskStatus::ToDo),
        "failed refresh changed the board"
    );
    eyre::ensure!(client.notifier.failures().len() == 1, "expected one failure notice");

    client.services.sync.refresh(DISCUSSION).await?;
    eyre::ensure!(
        client.column_of(TaskId::new(7))?.is_none(),
        "removed task is still on the board"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn moving_away_and_back_leaves_the_status_unchanged(
    gateway: Arc<InMemoryBoardGateway>,
) -> Result<(), eyre::Report> {
    let client = Client::connect(&gateway);
    client.services.sync.refresh(DISCUSSION).await?;

    for target in ["InReview", "ToDo"] {
        client
            .services
            .transitions
            .transition(TransitionRequest::new(TaskId::new(7), target).acting_as(CREATOR))
            .await?;
    }

    let stored = gateway
        .task(TaskId::new(7))
        .ok_or_else(|| eyre::eyre!("task 7 missing on the server"))?;
    eyre::ensure!(stored.status() == TaskStatus::ToDo, "server has {}", stored.status());
    eyre::ensure!(
        client.column_of(TaskId::new(7))? == Some(TaskStatus::ToDo),
        "task 7 is not back in ToDo"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn later_server_moves_show_when_the_client_clock_runs_ahead() -> Result<(), eyre::Report> {
    let gateway = Arc::new(InMemoryBoardGateway::with_clock(Arc::new(FixedClock(
        early_morning(),
    ))));
    gateway.insert_task(task(7, TaskStatus::ToDo));
    gateway.echo_status_updates(false);
    let alice = Client::connect(&gateway);
    let bob = Client::connect(&gateway);
    alice.services.sync.refresh(DISCUSSION).await?;

    alice
        .services
        .transitions
        .transition(TransitionRequest::new(TaskId::new(7), "InReview").acting_as(CREATOR))
        .await?;
    bob.services.sync.refresh(DISCUSSION).await?;
    bob.services
        .transitions
        .transition(TransitionRequest::new(TaskId::new(7), "Done").acting_as(ASSIGNEE))
        .await?;

    alice.services.sync.refresh(DISCUSSION).await?;
    eyre::ensure!(
        alice.column_of(TaskId::new(7))? == Some(TaskStatus::Done),
        "alice still shows {:?}",
        alice.column_of(TaskId::new(7))?
    );
    Ok(())
}
