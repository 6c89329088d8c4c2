//! Port contracts for the task board.
//!
//! Ports define infrastructure-agnostic interfaces used by board services.

pub mod gateway;
pub mod notifier;

pub use gateway::{
    BoardGateway, CreateTaskWithMessage, CreationReply, FieldUpdate, GatewayError,
    GatewayResult, StatusUpdate,
};
#[cfg(test)]
pub use gateway::MockBoardGateway;
pub use notifier::{Notice, NoticeLevel, Notifier};
