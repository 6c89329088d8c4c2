//! Taskboard: a kanban board bound to discussion threads.
//!
//! Tasks are grouped into five status columns, move between them by explicit
//! transition or drag-and-drop, and are created through a discussion together
//! with a task-typed message that mirrors the task's fields.
//!
//! # Architecture
//!
//! Taskboard follows hexagonal architecture principles:
//!
//! - **Domain**: tasks, statuses and messages with no infrastructure
//!   dependencies
//! - **Ports**: the remote gateway and the notice sink
//! - **Adapters**: REST and in-memory gateways
//! - **State and services**: the shared client board and the operations on it
//!
//! # Modules
//!
//! - [`board`]: the board itself
//! - [`config`]: runtime configuration
//! - [`telemetry`]: log subscriber setup

pub mod board;
pub mod config;
pub mod telemetry;
