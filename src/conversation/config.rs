//! Configuration types for agent routes and run polling

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// One entry of the route table: logical agent name → backend agent id
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct AgentRouteConfig {
    /// Logical name used in request paths (e.g. "event-pick")
    pub name: String,
    /// Backend agent id (e.g. "asst_...")
    pub agent_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Tera template for the outbound message, rendered with `{{ input }}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_template: Option<String>,
}

/// Run polling behaviour
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PollingSettings {
    /// Delay between run status checks
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Maximum time to wait for a terminal status; 0 disables the ceiling
    #[serde(default = "default_max_wait_secs")]
    pub max_wait_secs: u64,
}

fn default_interval_ms() -> u64 {
    1000
}

fn default_max_wait_secs() -> u64 {
    300
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            max_wait_secs: default_max_wait_secs(),
        }
    }
}

impl PollingSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn max_wait(&self) -> Option<Duration> {
        match self.max_wait_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

/// Backoff for idempotent reads against the agent service
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetrySettings {
    #[serde(default = "default_initial_interval_ms")]
    pub initial_interval_ms: u64,
    /// Give up retrying after this long; 0 disables retries
    #[serde(default = "default_max_elapsed_ms")]
    pub max_elapsed_ms: u64,
}

fn default_initial_interval_ms() -> u64 {
    200
}

fn default_max_elapsed_ms() -> u64 {
    5000
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            initial_interval_ms: default_initial_interval_ms(),
            max_elapsed_ms: default_max_elapsed_ms(),
        }
    }
}

impl RetrySettings {
    /// No retries at all
    pub fn disabled() -> Self {
        Self {
            initial_interval_ms: default_initial_interval_ms(),
            max_elapsed_ms: 0,
        }
    }
}
