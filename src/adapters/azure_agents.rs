//! Azure AI Foundry Agents client
//!
//! Talks to the project-scoped REST API (`/assistants`, `/threads`, `/threads/{id}/runs`, ...).
//! Every request carries the configured `api-version` query parameter.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::{RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use crate::config::{AuthScheme, BackendSettings};
use crate::conversation::error::{TransportError, TransportResult};
use crate::domain::{
    AgentsClient, AgentsConnector, ConversationThread, ListOrder, MessageRole, RemoteAgent, Run,
    ThreadMessage,
};

/// Page size used when listing thread messages
const MESSAGE_PAGE_SIZE: u32 = 100;

/// Connects to the agent service using a credential read from the environment
pub struct AzureAgentsConnector {
    settings: BackendSettings,
}

impl AzureAgentsConnector {
    pub fn new(settings: BackendSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl AgentsConnector for AzureAgentsConnector {
    async fn connect(&self) -> TransportResult<Arc<dyn AgentsClient>> {
        let env_var = &self.settings.credential_env;
        let credential = std::env::var(env_var)
            .map(SecretString::from)
            .map_err(|_| {
                TransportError::Authentication(format!("Environment variable {} not set", env_var))
            })?;

        let client = AzureAgentsClient::new(&self.settings, credential)?;
        tracing::info!("Agents client created for {}", self.settings.endpoint);
        Ok(Arc::new(client))
    }
}

/// A live connection to one agents project
pub struct AzureAgentsClient {
    client: reqwest::Client,
    base_url: String,
    api_version: String,
}

#[derive(Debug, Deserialize)]
struct MessagePage {
    data: Vec<ThreadMessage>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    last_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    code: Option<String>,
    message: String,
}

impl AzureAgentsClient {
    pub fn new(settings: &BackendSettings, credential: SecretString) -> TransportResult<Self> {
        let (name, raw) = match settings.auth_scheme {
            AuthScheme::Bearer => (AUTHORIZATION, format!("Bearer {}", credential.expose_secret())),
            AuthScheme::ApiKey => (
                HeaderName::from_static("api-key"),
                credential.expose_secret().to_string(),
            ),
        };
        let mut value = HeaderValue::from_str(&raw).map_err(|_| {
            TransportError::Authentication("Credential contains invalid header characters".to_string())
        })?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(name, value);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: settings.endpoint.trim_end_matches('/').to_string(),
            api_version: settings.api_version.clone(),
        })
    }

    fn url(&self, segments: &[&str]) -> String {
        let path: Vec<String> = segments
            .iter()
            .map(|s| urlencoding::encode(s).into_owned())
            .collect();
        format!("{}/{}", self.base_url, path.join("/"))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> TransportResult<T> {
        let response = request
            .query(&[("api-version", self.api_version.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_from_response(status, &body));
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| TransportError::Parse(e.to_string()))
    }
}

fn error_from_response(status: StatusCode, body: &str) -> TransportError {
    let message = match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => match parsed.error.code {
            Some(code) => format!("{}: {}", code, parsed.error.message),
            None => parsed.error.message,
        },
        Err(_) if !body.is_empty() => body.to_string(),
        Err(_) => status
            .canonical_reason()
            .unwrap_or("Unexpected status")
            .to_string(),
    };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            TransportError::Authentication(format!("{} - {}", status.as_u16(), message))
        }
        _ => TransportError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

#[async_trait]
impl AgentsClient for AzureAgentsClient {
    async fn get_agent(&self, agent_id: &str) -> TransportResult<RemoteAgent> {
        self.send(self.client.get(self.url(&["assistants", agent_id])))
            .await
    }

    async fn create_thread(&self) -> TransportResult<ConversationThread> {
        self.send(self.client.post(self.url(&["threads"])).json(&json!({})))
            .await
    }

    async fn create_message(
        &self,
        thread_id: &str,
        role: MessageRole,
        text: &str,
    ) -> TransportResult<ThreadMessage> {
        let body = json!({ "role": role.as_str(), "content": text });
        self.send(
            self.client
                .post(self.url(&["threads", thread_id, "messages"]))
                .json(&body),
        )
        .await
    }

    async fn create_run(&self, thread_id: &str, agent_id: &str) -> TransportResult<Run> {
        let body = json!({ "assistant_id": agent_id });
        self.send(
            self.client
                .post(self.url(&["threads", thread_id, "runs"]))
                .json(&body),
        )
        .await
    }

    async fn get_run(&self, thread_id: &str, run_id: &str) -> TransportResult<Run> {
        self.send(self.client.get(self.url(&["threads", thread_id, "runs", run_id])))
            .await
    }

    async fn list_messages(
        &self,
        thread_id: &str,
        order: ListOrder,
    ) -> TransportResult<Vec<ThreadMessage>> {
        let url = self.url(&["threads", thread_id, "messages"]);
        let limit = MESSAGE_PAGE_SIZE.to_string();
        let mut messages = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(&url)
                .query(&[("order", order.as_str()), ("limit", limit.as_str())]);
            if let Some(cursor) = &after {
                request = request.query(&[("after", cursor.as_str())]);
            }

            let page: MessagePage = self.send(request).await?;
            messages.extend(page.data);

            match page.last_id {
                Some(last_id) if page.has_more => after = Some(last_id),
                _ => break,
            }
        }

        Ok(messages)
    }

    async fn cancel_run(&self, thread_id: &str, run_id: &str) -> TransportResult<Run> {
        self.send(
            self.client
                .post(self.url(&["threads", thread_id, "runs", run_id, "cancel"]))
                .json(&json!({})),
        )
        .await
    }
}
