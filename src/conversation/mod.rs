//! Conversation-run orchestration
//!
//! A request flows through four stages:
//!
//! - `registry` - resolves a logical agent name to a live [`AgentHandle`](crate::domain::AgentHandle)
//! - `driver` - creates the thread, posts the message, starts and polls the run
//! - `transcript` - projects the thread's messages to ordered text records
//! - `result` - packages everything into a [`ConversationResult`](crate::domain::ConversationResult)
//!
//! [`ConversationOrchestrator`] composes them behind a single entry point.

pub mod config;
pub mod driver;
pub mod error;
pub mod orchestrator;
pub mod registry;
pub mod result;
pub mod retry;
pub mod transcript;

#[cfg(test)]
pub(crate) mod testing;

pub use driver::{RunDriver, RunOutcome};
pub use error::{ConversationError, GatewayResult, TransportError, TransportResult};
pub use orchestrator::ConversationOrchestrator;
pub use registry::AgentRegistry;
