//! Follows a discussion's task board from the terminal.
//!
//! Usage:
//!
//! ```text
//! board_watch <discussion-id>
//! ```
//!
//! The server location and timings come from `TASKBOARD_BASE_URL`,
//! `TASKBOARD_POLL_INTERVAL_MS` and `TASKBOARD_REQUEST_TIMEOUT_MS`. Board
//! changes are written to the log until the process is interrupted.

use mockable::DefaultClock;
use std::env;
use std::sync::Arc;
use taskboard::board::adapters::TracingNotifier;
use taskboard::board::adapters::http::HttpBoardGateway;
use taskboard::board::domain::{DiscussionId, TaskStatus};
use taskboard::board::ports::GatewayError;
use taskboard::board::services::BoardServices;
use taskboard::board::state::{Board, BoardEvent};
use taskboard::config::{BoardConfig, ConfigError};
use taskboard::telemetry::{self, TelemetryError};
use thiserror::Error;
use tokio::runtime::Builder;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

/// Errors that stop the watcher.
#[derive(Debug, Error)]
enum WatchError {
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("failed to build the HTTP client: {0}")]
    Gateway(#[from] GatewayError),
    #[error("runtime init failed: {0}")]
    RuntimeInit(#[source] std::io::Error),
}

fn main() -> Result<(), WatchError> {
    let discussion_id = parse_args(env::args().skip(1))?;
    let config = BoardConfig::from_env()?;
    telemetry::init_tracing(telemetry::DEFAULT_FILTER)?;
    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(WatchError::RuntimeInit)?;
    runtime.block_on(watch(&config, discussion_id))
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<DiscussionId, WatchError> {
    let raw = args
        .next()
        .ok_or_else(|| WatchError::InvalidArgs("expected <discussion-id>".to_owned()))?;
    if let Some(extra) = args.next() {
        return Err(WatchError::InvalidArgs(format!(
            "unexpected argument '{extra}'"
        )));
    }
    raw.trim()
        .parse::<i64>()
        .map(DiscussionId::new)
        .map_err(|_| WatchError::InvalidArgs(format!("'{raw}' is not a discussion id")))
}

async fn watch(config: &BoardConfig, discussion_id: DiscussionId) -> Result<(), WatchError> {
    let gateway = Arc::new(HttpBoardGateway::new(config)?);
    let mut services = BoardServices::new(
        config,
        gateway,
        Arc::new(TracingNotifier),
        Arc::new(DefaultClock),
    );
    let mut events = services.board.subscribe();
    info!(discussion_id = %discussion_id, base_url = config.base_url(), "watching board");
    services.poller.select(Some(discussion_id));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            received = events.recv() => match received {
                Ok(event) => log_event(&services.board, &event),
                Err(RecvError::Lagged(missed)) => warn!(missed, "board events were dropped"),
                Err(RecvError::Closed) => break,
            },
        }
    }
    services.poller.stop();
    info!(discussion_id = %discussion_id, "stopped watching board");
    Ok(())
}

fn log_event(board: &Board, event: &BoardEvent) {
    match event {
        BoardEvent::SnapshotApplied { .. } => {
            let counts = column_counts(board);
            info!(?event, ?counts, "board refreshed");
        }
        other => info!(event = ?other, "board changed"),
    }
}

fn column_counts(board: &Board) -> Vec<(TaskStatus, usize)> {
    TaskStatus::ALL
        .into_iter()
        .map(|status| (status, board.column_ids(status).map_or(0, |ids| ids.len())))
        .collect()
}
