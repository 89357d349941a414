//! Conversation orchestrator: the single entry point used by the HTTP layer

use std::sync::Arc;

use tera::{Context, Tera};
use tokio::time::Instant;

use super::config::RetrySettings;
use super::driver::RunDriver;
use super::error::{ConversationError, GatewayResult};
use super::registry::AgentRegistry;
use super::{result, transcript};
use crate::adapters::metrics_handler::MetricsCollector;
use crate::config::Settings;
use crate::domain::{AgentsConnector, ConversationResult};

pub struct ConversationOrchestrator {
    registry: AgentRegistry,
    driver: RunDriver,
    retry: RetrySettings,
    templates: Tera,
    metrics: Option<Arc<MetricsCollector>>,
}

impl ConversationOrchestrator {
    /// Build an orchestrator for the route table in `settings`
    pub fn new(connector: Arc<dyn AgentsConnector>, settings: &Settings) -> GatewayResult<Self> {
        let mut templates = Tera::default();
        for route in &settings.agents {
            if let Some(template) = &route.prompt_template {
                templates.add_raw_template(&route.name, template)?;
            }
        }

        Ok(Self {
            registry: AgentRegistry::new(connector, &settings.agents, settings.retry.clone()),
            driver: RunDriver::new(&settings.polling, settings.retry.clone()),
            retry: settings.retry.clone(),
            templates,
            metrics: None,
        })
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.registry = self.registry.with_metrics(metrics.clone());
        self.metrics = Some(metrics);
        self
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    /// Run one conversation turn against `agent_name`.
    ///
    /// Never fails: every error is folded into a failure-shaped result.
    pub async fn run_conversation(&self, agent_name: &str, user_text: &str) -> ConversationResult {
        let started = Instant::now();

        let result = match self.try_run(agent_name, user_text).await {
            Ok(result) => result,
            Err(err) => {
                match &err {
                    ConversationError::Validation(_) | ConversationError::UnknownAgent(_) => {
                        tracing::debug!("Rejected conversation for '{}': {}", agent_name, err)
                    }
                    _ => tracing::error!("Conversation with '{}' failed: {}", agent_name, err),
                }
                ConversationResult::from_error(&err)
            }
        };

        tracing::debug!(
            "Conversation with '{}' finished in {:?} (success: {}, thread: {:?})",
            agent_name,
            started.elapsed(),
            result.is_success(),
            result.thread_id()
        );

        if let Some(metrics) = &self.metrics {
            let label = if self.registry.is_supported(agent_name) {
                agent_name
            } else {
                "unknown"
            };
            metrics.record_conversation(label, &result, started.elapsed());
        }

        result
    }

    async fn try_run(&self, agent_name: &str, user_text: &str) -> GatewayResult<ConversationResult> {
        if !self.registry.is_supported(agent_name) {
            return Err(ConversationError::UnknownAgent(agent_name.to_string()));
        }

        let input = user_text.trim();
        if input.is_empty() {
            return Err(ConversationError::Validation("Input text must not be empty".to_string()));
        }

        let handle = self.registry.resolve(agent_name).await?;
        let outbound = self.render_prompt(agent_name, input)?;

        let outcome = self.driver.execute(&handle, &outbound).await?;
        if let Some(metrics) = &self.metrics {
            metrics.record_poll_cycles(agent_name, outcome.poll_cycles);
        }

        let messages = transcript::extract(handle.connection.as_ref(), &outcome.thread, &self.retry).await?;

        Ok(result::assemble(&handle, &outcome, input, messages))
    }

    fn render_prompt(&self, agent_name: &str, input: &str) -> GatewayResult<String> {
        if !self.templates.get_template_names().any(|name| name == agent_name) {
            return Ok(input.to_string());
        }
        let mut context = Context::new();
        context.insert("input", input);
        Ok(self.templates.render(agent_name, &context)?)
    }

    /// Start a fresh thread on an agent's existing connection.
    ///
    /// Returns `None` when the agent has not been used yet, since there is no connection in
    /// scope to create the thread on.
    pub async fn reset_thread(&self, agent_name: &str) -> GatewayResult<Option<String>> {
        if !self.registry.is_supported(agent_name) {
            return Err(ConversationError::UnknownAgent(agent_name.to_string()));
        }

        match self.registry.cached(agent_name) {
            Some(handle) => {
                let thread = handle.connection.create_thread().await?;
                tracing::info!("New thread {} created for agent '{}'", thread.id, agent_name);
                Ok(Some(thread.id))
            }
            None => Ok(None),
        }
    }
}
