//! Agent resolver: maps logical agent names to live agent handles.
//!
//! The set of names is fixed by the route table at construction. Each name owns a
//! [`OnceCell`] slot, so concurrent first-time resolutions of the same name collapse into a
//! single agent lookup, and the registry shares one lazily established connection.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::OnceCell;

use super::config::{AgentRouteConfig, RetrySettings};
use super::error::{ConversationError, GatewayResult};
use super::retry;
use crate::adapters::metrics_handler::MetricsCollector;
use crate::domain::{AgentHandle, AgentsClient, AgentsConnector};

struct AgentSlot {
    agent_id: String,
    handle: OnceCell<AgentHandle>,
}

/// Process-scoped cache of agent handles
pub struct AgentRegistry {
    connector: Arc<dyn AgentsConnector>,
    connection: OnceCell<Arc<dyn AgentsClient>>,
    slots: HashMap<String, AgentSlot>,
    retry: RetrySettings,
    metrics: Option<Arc<MetricsCollector>>,
}

impl AgentRegistry {
    pub fn new(
        connector: Arc<dyn AgentsConnector>,
        routes: &[AgentRouteConfig],
        retry: RetrySettings,
    ) -> Self {
        let slots = routes
            .iter()
            .map(|route| {
                (
                    route.name.clone(),
                    AgentSlot {
                        agent_id: route.agent_id.clone(),
                        handle: OnceCell::new(),
                    },
                )
            })
            .collect();

        Self {
            connector,
            connection: OnceCell::new(),
            slots,
            retry,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Whether `name` is in the route table
    pub fn is_supported(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    /// Logical names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.slots.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Resolve `name`, establishing the connection and agent identity on first use.
    ///
    /// A failed first use leaves the slot empty, so the next call tries again.
    pub async fn resolve(&self, name: &str) -> GatewayResult<AgentHandle> {
        let slot = self
            .slots
            .get(name)
            .ok_or_else(|| ConversationError::UnknownAgent(name.to_string()))?;

        let handle = slot
            .handle
            .get_or_try_init(|| self.establish(name, &slot.agent_id))
            .await?;

        Ok(handle.clone())
    }

    /// The handle for `name` if it has already been established
    pub fn cached(&self, name: &str) -> Option<AgentHandle> {
        self.slots.get(name).and_then(|slot| slot.handle.get().cloned())
    }

    async fn connection(&self) -> GatewayResult<Arc<dyn AgentsClient>> {
        let connection = self
            .connection
            .get_or_try_init(|| async {
                let connection = self.connector.connect().await?;
                tracing::info!("Agent service connection established");
                if let Some(metrics) = &self.metrics {
                    metrics.agent_connections.inc();
                }
                Ok::<_, ConversationError>(connection)
            })
            .await?;

        Ok(connection.clone())
    }

    async fn establish(&self, name: &str, agent_id: &str) -> GatewayResult<AgentHandle> {
        let connection = self.connection().await?;
        let agent = retry::idempotent(&self.retry, "get_agent", || connection.get_agent(agent_id)).await?;
        let display_name = agent.name.unwrap_or_else(|| agent.id.clone());

        tracing::info!("Agent '{}' resolved to {} ({})", name, display_name, agent.id);

        Ok(AgentHandle {
            logical_name: name.to_string(),
            connection,
            agent_id: agent.id,
            agent_display_name: display_name,
        })
    }
}
