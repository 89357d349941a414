//! Error types for conversation orchestration

use std::time::Duration;

use thiserror::Error;

use crate::domain::RunError;

/// Errors that can occur while running a conversation
#[derive(Debug, Error)]
pub enum ConversationError {
    /// Caller-supplied input missing or invalid
    #[error("Validation error: {0}")]
    Validation(String),

    /// Logical agent name is not in the route table
    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    /// Fault while talking to the remote agent service
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The remote run reached the `failed` terminal state
    #[error("Run {run_id} on thread {thread_id} failed")]
    RunFailed {
        thread_id: String,
        run_id: String,
        last_error: Option<RunError>,
    },

    /// The run did not reach a terminal state within the configured maximum wait
    #[error("Run {run_id} on thread {thread_id} did not finish within {}s", waited.as_secs())]
    Timeout {
        thread_id: String,
        run_id: String,
        waited: Duration,
    },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors raised by the remote agents client
#[derive(Debug, Error)]
pub enum TransportError {
    /// Missing or rejected credentials
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Non-success HTTP status from the remote service
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Network error
    #[error("Network error: {0}")]
    Network(String),

    /// Response body could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// Request timed out
    #[error("Request timed out")]
    Timeout,
}

impl TransportError {
    /// Whether an idempotent read that failed this way is worth retrying
    pub fn is_transient(&self) -> bool {
        match self {
            TransportError::Network(_) | TransportError::Timeout => true,
            TransportError::Api { status, .. } => *status == 429 || *status >= 500,
            TransportError::Authentication(_) | TransportError::Parse(_) => false,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Network(format!("Connection error: {}", err))
        } else if err.is_decode() {
            TransportError::Parse(err.to_string())
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

impl From<tera::Error> for ConversationError {
    fn from(err: tera::Error) -> Self {
        ConversationError::Internal(format!("Prompt template error: {}", err))
    }
}

/// Result type alias for conversation operations
pub type GatewayResult<T> = Result<T, ConversationError>;

/// Result type alias for remote client operations
pub type TransportResult<T> = Result<T, TransportError>;
