//! Result assembly. Pure functions, no failure modes of their own.

use serde_json::{json, Value};

use super::driver::RunOutcome;
use super::error::{ConversationError, TransportError};
use crate::domain::{
    AgentHandle, ConversationFailure, ConversationResult, ConversationSuccess, ErrorKind,
    TranscriptMessage,
};

/// Package a finished run into a success result
pub fn assemble(
    handle: &AgentHandle,
    outcome: &RunOutcome,
    input: &str,
    messages: Vec<TranscriptMessage>,
) -> ConversationResult {
    ConversationResult::Success(ConversationSuccess {
        thread_id: outcome.thread.id.clone(),
        agent_name: handle.agent_display_name.clone(),
        input: input.to_string(),
        messages,
        run_status: outcome.run.status,
    })
}

impl ConversationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConversationError::Validation(_) => ErrorKind::Validation,
            ConversationError::UnknownAgent(_) => ErrorKind::UnknownAgent,
            ConversationError::Transport(_) => ErrorKind::Transport,
            ConversationError::RunFailed { .. } => ErrorKind::RunFailed,
            ConversationError::Timeout { .. } => ErrorKind::Timeout,
            ConversationError::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl From<&ConversationError> for ConversationFailure {
    fn from(err: &ConversationError) -> Self {
        let (message, details, thread_id) = match err {
            ConversationError::Validation(reason) => {
                ("Invalid request".to_string(), json!(reason), None)
            }
            ConversationError::UnknownAgent(name) => (
                format!("Unknown agent '{}'", name),
                json!({ "agent": name }),
                None,
            ),
            ConversationError::Transport(transport) => (
                "Agent service request failed".to_string(),
                transport_details(transport),
                None,
            ),
            ConversationError::RunFailed {
                thread_id,
                run_id,
                last_error,
            } => (
                "Agent run failed".to_string(),
                match last_error {
                    Some(error) => json!({ "code": error.code, "message": error.message, "runId": run_id }),
                    None => json!({ "runId": run_id }),
                },
                Some(thread_id.clone()),
            ),
            ConversationError::Timeout {
                thread_id,
                run_id,
                waited,
            } => (
                "Agent run did not finish in time".to_string(),
                json!({ "runId": run_id, "waitedSeconds": waited.as_secs() }),
                Some(thread_id.clone()),
            ),
            ConversationError::Internal(reason) => {
                ("Internal error".to_string(), json!(reason), None)
            }
        };

        ConversationFailure {
            kind: err.kind(),
            message,
            details,
            thread_id,
        }
    }
}

fn transport_details(err: &TransportError) -> Value {
    match err {
        TransportError::Api { status, message } => json!({ "status": status, "message": message }),
        other => json!(other.to_string()),
    }
}

impl ConversationResult {
    pub fn from_error(err: &ConversationError) -> Self {
        ConversationResult::Failure(err.into())
    }
}
