use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::conversation::ConversationOrchestrator;

const SERVICE_NAME: &str = "agent-gateway";

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    pub service: String,
    pub uptime_seconds: u64,
}

pub struct HealthHandler {
    orchestrator: Arc<ConversationOrchestrator>,
    start_time: std::time::Instant,
}

impl HealthHandler {
    pub fn new(orchestrator: Arc<ConversationOrchestrator>) -> Self {
        Self {
            orchestrator,
            start_time: std::time::Instant::now(),
        }
    }

    /// Basic health check - returns 200 if server is running
    pub async fn health(&self) -> impl IntoResponse {
        let status = HealthStatus {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            service: SERVICE_NAME.to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        };

        (StatusCode::OK, Json(status))
    }

    /// Readiness check - returns 200 once at least one agent route is configured.
    /// The agent service itself is not contacted.
    pub async fn ready(&self) -> impl IntoResponse {
        let agents = self.orchestrator.registry().names();

        if agents.is_empty() {
            (StatusCode::SERVICE_UNAVAILABLE, Json(serde_json::json!({
                "status": "not_ready",
                "message": "No agent routes configured"
            })))
        } else {
            (StatusCode::OK, Json(serde_json::json!({
                "status": "ready",
                "message": "Server is ready to accept requests",
                "agents": agents
            })))
        }
    }

    /// Liveness check - returns 200 if server is alive
    pub async fn live(&self) -> impl IntoResponse {
        (StatusCode::OK, Json(serde_json::json!({
            "status": "alive",
            "message": "Server is alive"
        })))
    }
}
