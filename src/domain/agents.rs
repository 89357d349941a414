//! Records exchanged with the remote agent-execution service and the ports used to reach it

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::conversation::error::TransportResult;

/// Agent definition as returned by the remote service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoteAgent {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// A remote conversation thread. Created fresh for every request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationThread {
    pub id: String,
}

/// Author of a thread message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

/// Status of a remote run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Incomplete,
    Expired,
    /// A status this gateway does not know about; treated as terminal
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    /// A run is still pending only while queued or in progress
    pub fn is_pending(&self) -> bool {
        matches!(self, RunStatus::Queued | RunStatus::InProgress)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_pending()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::RequiresAction => "requires_action",
            RunStatus::Cancelling => "cancelling",
            RunStatus::Cancelled => "cancelled",
            RunStatus::Failed => "failed",
            RunStatus::Completed => "completed",
            RunStatus::Incomplete => "incomplete",
            RunStatus::Expired => "expired",
            RunStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured diagnostic attached to a failed run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// An asynchronous execution of an agent against a thread
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Run {
    pub id: String,
    pub thread_id: String,
    pub status: RunStatus,
    #[serde(default)]
    pub last_error: Option<RunError>,
}

/// Text payload of a content part
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextContent {
    pub value: String,
}

/// One part of a thread message's content
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: TextContent },
    /// Images, file references and anything else without text
    #[serde(other)]
    Other,
}

impl ContentPart {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentPart::Text { text } => Some(&text.value),
            ContentPart::Other => None,
        }
    }
}

/// A message stored on a remote thread
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThreadMessage {
    pub id: String,
    pub role: MessageRole,
    #[serde(default)]
    pub content: Vec<ContentPart>,
    pub created_at: i64,
}

/// Sort order for listing thread messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOrder {
    Asc,
    Desc,
}

impl ListOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListOrder::Asc => "asc",
            ListOrder::Desc => "desc",
        }
    }
}

/// Operations the orchestrator needs from a live connection to the agent service.
///
/// Implementations must be safe to share between concurrent requests.
#[async_trait]
pub trait AgentsClient: Send + Sync {
    async fn get_agent(&self, agent_id: &str) -> TransportResult<RemoteAgent>;

    async fn create_thread(&self) -> TransportResult<ConversationThread>;

    async fn create_message(
        &self,
        thread_id: &str,
        role: MessageRole,
        text: &str,
    ) -> TransportResult<ThreadMessage>;

    async fn create_run(&self, thread_id: &str, agent_id: &str) -> TransportResult<Run>;

    async fn get_run(&self, thread_id: &str, run_id: &str) -> TransportResult<Run>;

    /// List every message on the thread, following pagination to the end
    async fn list_messages(
        &self,
        thread_id: &str,
        order: ListOrder,
    ) -> TransportResult<Vec<ThreadMessage>>;

    async fn cancel_run(&self, thread_id: &str, run_id: &str) -> TransportResult<Run>;
}

/// Establishes connections to the agent service
#[async_trait]
pub trait AgentsConnector: Send + Sync {
    async fn connect(&self) -> TransportResult<Arc<dyn AgentsClient>>;
}
