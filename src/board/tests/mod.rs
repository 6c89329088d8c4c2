//! Unit tests for the board module.
//!
//! Tests are organised by component: domain values, the task store, then
//! each service against a mocked or in-memory gateway.

mod store_tests;
