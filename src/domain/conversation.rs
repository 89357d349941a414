//! Values produced by a conversation run

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::agents::{AgentsClient, MessageRole, RunStatus};

/// A resolved agent: live connection plus the backend agent identity.
///
/// Cloning is cheap; the connection is shared.
#[derive(Clone)]
pub struct AgentHandle {
    pub logical_name: String,
    pub connection: Arc<dyn AgentsClient>,
    pub agent_id: String,
    pub agent_display_name: String,
}

impl fmt::Debug for AgentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentHandle")
            .field("logical_name", &self.logical_name)
            .field("agent_id", &self.agent_id)
            .field("agent_display_name", &self.agent_display_name)
            .finish_non_exhaustive()
    }
}

/// Text-only projection of a thread message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranscriptMessage {
    pub role: MessageRole,
    pub content: String,
    /// Creation time, epoch seconds
    pub timestamp: i64,
}

/// Successful conversation payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSuccess {
    pub thread_id: String,
    pub agent_name: String,
    /// The caller's trimmed input, never the templated outbound text
    pub input: String,
    pub messages: Vec<TranscriptMessage>,
    pub run_status: RunStatus,
}

/// Failure categories surfaced to the boundary layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    UnknownAgent,
    Transport,
    RunFailed,
    Timeout,
    Internal,
}

/// Failed conversation payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConversationFailure {
    pub kind: ErrorKind,
    pub message: String,
    pub details: Value,
    /// Set when a thread had already been created, for diagnosis
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
}

/// The single value returned across the orchestrator boundary
#[derive(Debug, Clone, PartialEq)]
pub enum ConversationResult {
    Success(ConversationSuccess),
    Failure(ConversationFailure),
}

impl ConversationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ConversationResult::Success(_))
    }

    pub fn thread_id(&self) -> Option<&str> {
        match self {
            ConversationResult::Success(s) => Some(&s.thread_id),
            ConversationResult::Failure(f) => f.thread_id.as_deref(),
        }
    }
}
