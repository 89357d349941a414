//! # Agent Gateway
//!
//! HTTP front door for remote conversational agents. Each request names a configured agent route,
//! the gateway posts the caller's text to a fresh thread on the remote agent service, polls the run
//! until it finishes and answers with the thread's text transcript.
//!
//! ## Features
//!
//! - **Route table**: logical agent names mapped to backend agent ids, with optional prompt templates
//! - **Single-flight resolution**: one connection and one agent lookup per name, shared across requests
//! - **Bounded polling**: configurable poll interval and maximum wait, with cancellation on timeout
//! - **Metrics**: Prometheus metrics for monitoring
//! - **Health Checks**: Kubernetes-ready health endpoints
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use agent_gateway::config::Settings;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Load configuration
//!     let settings = Settings::new()?;
//!
//!     // Server will start on configured host:port
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Domain**: Core types and the ports to the agent service
//! - **Conversation**: Registry, run driver, transcript extraction and result assembly
//! - **Adapters**: External integrations (HTTP handlers, agent service client, metrics)
//! - **Config**: Configuration management

pub mod adapters;
pub mod cli;
pub mod config;
pub mod conversation;
pub mod domain;

use crate::adapters::api_handler::{self, ApiResponse, ApiState};
use crate::adapters::health_handler::HealthHandler;
use crate::adapters::metrics_handler::MetricsHandler;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::any::Any;
use std::sync::Arc;
use tower_http::{
    catch_panic::CatchPanicLayer, compression::CompressionLayer, cors::CorsLayer,
    set_header::SetResponseHeaderLayer, trace::TraceLayer,
};

const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; frame-ancestors 'none'";

/// Creates the Axum application router with all endpoints configured.
///
/// # Arguments
///
/// * `state` - Orchestrator and settings shared by the agent endpoints
/// * `health_handler` - Health check handler
/// * `metrics_handler` - Metrics collection handler
///
/// # Returns
///
/// Configured Axum Router
pub fn create_app(
    state: ApiState,
    health_handler: Arc<HealthHandler>,
    metrics_handler: Arc<MetricsHandler>,
) -> Router {
    let settings = state.settings.clone();

    // Public routes (never rate limited)
    let public_router = Router::new()
        .route("/api/health", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.health().await }
            }
        }))
        .route("/api/health/ready", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.ready().await }
            }
        }))
        .route("/api/health/live", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.live().await }
            }
        }));

    let mut protected_router = Router::new()
        .route("/metrics", get({
            let handler = metrics_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.metrics().await }
            }
        }))
        .route("/api/agent/chatbot", post(api_handler::run_chatbot))
        .route("/api/agent/:agent_name/:store_id", get(api_handler::run_agent))
        .route("/api/threads/:agent_name/reset", post(api_handler::reset_thread))
        .with_state(state);

    if let Some(rate_limit) = &settings.rate_limit {
        if rate_limit.enabled {
            let limiter = crate::adapters::rate_limit::create_limiter(
                rate_limit.requests_per_second,
                rate_limit.burst_size,
            );

            protected_router = protected_router.layer(axum::middleware::from_fn_with_state(
                limiter,
                crate::adapters::rate_limit::rate_limit_middleware,
            ));
        }
    }

    public_router
        .merge(protected_router)
        .fallback(api_handler::not_found)
        .layer(DefaultBodyLimit::max(settings.server.body_limit_bytes))
        .layer(CompressionLayer::new())
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static(CONTENT_SECURITY_POLICY),
        ))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!("Handler panicked: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::failure(
            "Internal server error",
            "Something went wrong",
            None,
        )),
    )
        .into_response()
}
