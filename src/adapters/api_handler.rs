//! REST API handlers for the agent endpoints
//!
//! Every response is wrapped in [`ApiResponse`]: `{success, data}` on success and
//! `{success, error, message, details}` on failure.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::config::Settings;
use crate::conversation::{ConversationError, ConversationOrchestrator};
use crate::domain::{ConversationFailure, ConversationResult, ConversationSuccess, ErrorKind};

/// Route name used by the free-text chat endpoint
pub const CHATBOT_AGENT: &str = "chatbot";

/// Shared application state for API handlers
#[derive(Clone)]
pub struct ApiState {
    pub orchestrator: Arc<ConversationOrchestrator>,
    pub settings: Arc<Settings>,
}

/// Response envelope for all API endpoints
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
            details: None,
            thread_id: None,
        }
    }

    pub fn failure(error: &str, message: impl Into<String>, details: Option<Value>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.to_string()),
            message: Some(message.into()),
            details,
            thread_id: None,
        }
    }
}

/// Successful conversation payload, stamped with the response time
#[derive(Debug, Serialize)]
pub struct ConversationData {
    #[serde(flatten)]
    pub conversation: ConversationSuccess,
    pub timestamp: String,
}

fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation | ErrorKind::UnknownAgent => StatusCode::BAD_REQUEST,
        ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorKind::Transport | ErrorKind::RunFailed | ErrorKind::Internal => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn error_label(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Validation | ErrorKind::UnknownAgent => "Validation error",
        ErrorKind::Timeout => "Agent run timed out",
        ErrorKind::Transport | ErrorKind::RunFailed => "Agent conversation failed",
        ErrorKind::Internal => "Internal server error",
    }
}

fn failure_response(failure: ConversationFailure) -> Response {
    let status = status_for(failure.kind);
    let mut body =
        ApiResponse::<()>::failure(error_label(failure.kind), failure.message, Some(failure.details));
    body.thread_id = failure.thread_id;
    (status, Json(body)).into_response()
}

fn validation_error(message: impl Into<String>, details: Option<Value>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::<()>::failure("Validation error", message, details)),
    )
        .into_response()
}

fn conversation_response(result: ConversationResult) -> Response {
    match result {
        ConversationResult::Success(conversation) => (
            StatusCode::OK,
            Json(ApiResponse::success(ConversationData {
                conversation,
                timestamp: timestamp(),
            })),
        )
            .into_response(),
        ConversationResult::Failure(failure) => failure_response(failure),
    }
}

/// GET /api/agent/:agent_name/:store_id
pub async fn run_agent(
    State(state): State<ApiState>,
    Path((agent_name, store_id)): Path<(String, String)>,
) -> Response {
    let store_id = store_id.trim();
    if store_id.is_empty() {
        return validation_error("Store ID is required", None);
    }

    tracing::info!("Running agent '{}' for store {}", agent_name, store_id);
    let result = state.orchestrator.run_conversation(&agent_name, store_id).await;
    conversation_response(result)
}

/// POST /api/agent/chatbot
pub async fn run_chatbot(
    State(state): State<ApiState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            return (
                rejection.status(),
                Json(ApiResponse::<()>::failure(
                    "Validation error",
                    "Request body must be a JSON object",
                    Some(json!(rejection.body_text())),
                )),
            )
                .into_response()
        }
    };

    let message = body
        .get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty());

    let Some(message) = message else {
        return validation_error(
            "Message is required and must be a non-empty string. Send as {\"message\": \"your message\"}",
            Some(json!({ "receivedBody": body })),
        );
    };

    let max_chars = state.settings.server.max_message_chars;
    if message.chars().count() > max_chars {
        return validation_error(
            format!("Message must be {} characters or less", max_chars),
            None,
        );
    }

    let result = state.orchestrator.run_conversation(CHATBOT_AGENT, message).await;
    conversation_response(result)
}

/// POST /api/threads/:agent_name/reset
pub async fn reset_thread(
    State(state): State<ApiState>,
    Path(agent_name): Path<String>,
) -> Response {
    match state.orchestrator.reset_thread(&agent_name).await {
        Ok(new_thread_id) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": format!("Thread reset for agent '{}'", agent_name),
                "newThreadId": new_thread_id,
            })),
        )
            .into_response(),
        Err(err) => {
            if !matches!(err, ConversationError::UnknownAgent(_)) {
                tracing::error!("Thread reset for '{}' failed: {}", agent_name, err);
            }
            failure_response(ConversationFailure::from(&err))
        }
    }
}

/// Fallback for unmatched routes
pub async fn not_found(uri: Uri) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::failure(
            "Not Found",
            format!("Route {} does not exist", uri.path()),
            None,
        )),
    )
        .into_response()
}
