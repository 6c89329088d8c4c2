//! Task board for discussion threads.
//!
//! Tasks live in five status columns and are created through a discussion
//! together with a task-typed message that mirrors the task's fields. Status
//! changes are applied locally first and rolled back when the server rejects
//! them. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Shared client state in [`state`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod services;
pub mod state;

#[cfg(test)]
mod tests;
