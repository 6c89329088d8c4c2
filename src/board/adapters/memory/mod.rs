//! In-memory adapters for tests and demos.
//!
//! [`InMemoryBoardGateway`] behaves like the board server: it assigns ids,
//! keeps task messages in step with their tasks and deduplicates retried
//! creations. Failures, latency and malformed creation replies can be
//! injected per endpoint.

mod gateway;
mod notifier;

pub use gateway::{CreationFault, Endpoint, GatewayCall, InMemoryBoardGateway};
pub use notifier::RecordingNotifier;
