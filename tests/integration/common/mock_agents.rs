//! wiremock stand-in for the remote Agents API

use agent_gateway::config::{AuthScheme, BackendSettings, ServerSettings, Settings};
use agent_gateway::conversation::config::{AgentRouteConfig, PollingSettings, RetrySettings};
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN_ENV: &str = "GATEWAY_TEST_AGENTS_TOKEN";
pub const TOKEN: &str = "test-token";
pub const PROJECT_PATH: &str = "/api/projects/demo";

pub struct MockAgentService {
    pub server: MockServer,
}

impl MockAgentService {
    pub async fn start() -> Self {
        std::env::set_var(TOKEN_ENV, TOKEN);
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.server.uri(), PROJECT_PATH)
    }

    fn route(&self, suffix: &str) -> String {
        format!("{}{}", PROJECT_PATH, suffix)
    }

    /// Fast polling, a one second ceiling and no retries
    pub fn settings(&self, agents: Vec<AgentRouteConfig>) -> Settings {
        Settings {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 0,
                body_limit_bytes: 64 * 1024,
                max_message_chars: 1000,
            },
            backend: BackendSettings {
                endpoint: self.endpoint(),
                api_version: "v1".to_string(),
                auth_scheme: AuthScheme::Bearer,
                credential_env: TOKEN_ENV.to_string(),
                request_timeout_secs: 5,
            },
            polling: PollingSettings {
                interval_ms: 20,
                max_wait_secs: 1,
            },
            retry: RetrySettings {
                initial_interval_ms: 10,
                max_elapsed_ms: 0,
            },
            agents,
            rate_limit: None,
        }
    }

    pub async fn mount_agent(&self, agent_id: &str, name: &str) {
        Mock::given(method("GET"))
            .and(path(self.route(&format!("/assistants/{}", agent_id))))
            .and(query_param("api-version", "v1"))
            .and(header("authorization", format!("Bearer {}", TOKEN).as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": agent_id,
                "object": "assistant",
                "name": name
            })))
            .mount(&self.server)
            .await;
    }

    /// Thread creation, message posting and run creation for `thread_id`
    pub async fn mount_thread(&self, thread_id: &str, agent_id: &str) {
        Mock::given(method("POST"))
            .and(path(self.route("/threads")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": thread_id,
                "object": "thread",
                "created_at": 1_700_000_000
            })))
            .mount(&self.server)
            .await;

        Mock::given(method("POST"))
            .and(path(self.route(&format!("/threads/{}/messages", thread_id))))
            .and(body_partial_json(json!({ "role": "user" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_message(
                "msg_user",
                "user",
                "posted",
                1_700_000_001,
            )))
            .mount(&self.server)
            .await;

        Mock::given(method("POST"))
            .and(path(self.route(&format!("/threads/{}/runs", thread_id))))
            .and(body_partial_json(json!({ "assistant_id": agent_id })))
            .respond_with(ResponseTemplate::new(200).set_body_json(run(thread_id, "queued", None)))
            .mount(&self.server)
            .await;
    }

    /// Answer `in_progress` for the first `pending_polls` status checks, then `status`
    pub async fn mount_run_status(
        &self,
        thread_id: &str,
        pending_polls: u64,
        status: &str,
        last_error: Option<Value>,
    ) {
        let run_path = self.route(&format!("/threads/{}/runs/run_1", thread_id));
        if pending_polls > 0 {
            Mock::given(method("GET"))
                .and(path(run_path.clone()))
                .respond_with(
                    ResponseTemplate::new(200).set_body_json(run(thread_id, "in_progress", None)),
                )
                .up_to_n_times(pending_polls)
                .with_priority(1)
                .mount(&self.server)
                .await;
        }

        Mock::given(method("GET"))
            .and(path(run_path))
            .respond_with(ResponseTemplate::new(200).set_body_json(run(thread_id, status, last_error)))
            .with_priority(2)
            .mount(&self.server)
            .await;
    }

    pub async fn mount_cancel(&self, thread_id: &str) {
        Mock::given(method("POST"))
            .and(path(self.route(&format!("/threads/{}/runs/run_1/cancel", thread_id))))
            .respond_with(ResponseTemplate::new(200).set_body_json(run(thread_id, "cancelling", None)))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    pub async fn mount_messages(&self, thread_id: &str, messages: Vec<Value>) {
        let last_id = messages.last().and_then(|m| m["id"].as_str()).map(str::to_string);
        Mock::given(method("GET"))
            .and(path(self.route(&format!("/threads/{}/messages", thread_id))))
            .and(query_param("order", "asc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "data": messages,
                "first_id": null,
                "last_id": last_id,
                "has_more": false
            })))
            .mount(&self.server)
            .await;
    }
}

pub fn route(name: &str, agent_id: &str, template: Option<&str>) -> AgentRouteConfig {
    AgentRouteConfig {
        name: name.to_string(),
        agent_id: agent_id.to_string(),
        description: None,
        prompt_template: template.map(str::to_string),
    }
}

pub fn run(thread_id: &str, status: &str, last_error: Option<Value>) -> Value {
    json!({
        "id": "run_1",
        "object": "thread.run",
        "thread_id": thread_id,
        "assistant_id": "asst_any",
        "status": status,
        "last_error": last_error
    })
}

pub fn text_message(id: &str, role: &str, text: &str, created_at: i64) -> Value {
    json!({
        "id": id,
        "object": "thread.message",
        "role": role,
        "created_at": created_at,
        "content": [
            { "type": "text", "text": { "value": text, "annotations": [] } }
        ]
    })
}
