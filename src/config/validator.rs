use std::collections::HashMap;
use thiserror::Error;

use crate::config::{BackendSettings, RateLimitConfig, ServerSettings, Settings};
use crate::conversation::config::{AgentRouteConfig, PollingSettings};

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Duplicate entry: {0}")]
    Duplicate(String),
}

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(settings: &Settings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = Self::validate_server(&settings.server) {
            errors.extend(e);
        }

        if let Err(e) = Self::validate_backend(&settings.backend) {
            errors.extend(e);
        }

        if let Err(e) = Self::validate_polling(&settings.polling) {
            errors.extend(e);
        }

        if let Err(e) = Self::validate_agents(&settings.agents) {
            errors.extend(e);
        }

        if let Some(rate_limit) = &settings.rate_limit {
            if let Err(e) = Self::validate_rate_limit(rate_limit) {
                errors.extend(e);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_server(server: &ServerSettings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if server.host.is_empty() {
            errors.push(ValidationError::MissingField("server.host".to_string()));
        }

        if server.port == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if server.max_message_chars == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "server.max_message_chars".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_backend(backend: &BackendSettings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if backend.endpoint.is_empty() {
            errors.push(ValidationError::MissingField("backend.endpoint".to_string()));
        } else if let Err(e) = reqwest::Url::parse(&backend.endpoint) {
            errors.push(ValidationError::InvalidValue {
                field: "backend.endpoint".to_string(),
                reason: e.to_string(),
            });
        }

        if backend.api_version.is_empty() {
            errors.push(ValidationError::MissingField("backend.api_version".to_string()));
        }

        if backend.credential_env.is_empty() {
            errors.push(ValidationError::MissingField("backend.credential_env".to_string()));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_polling(polling: &PollingSettings) -> Result<(), Vec<ValidationError>> {
        if polling.interval_ms == 0 {
            return Err(vec![ValidationError::InvalidValue {
                field: "polling.interval_ms".to_string(),
                reason: "Poll interval must be greater than 0".to_string(),
            }]);
        }
        Ok(())
    }

    fn validate_agents(agents: &[AgentRouteConfig]) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        let mut seen_names = HashMap::new();
        let mut names_by_id: HashMap<&str, Vec<&str>> = HashMap::new();

        for (idx, agent) in agents.iter().enumerate() {
            if let Some(prev_idx) = seen_names.insert(&agent.name, idx) {
                errors.push(ValidationError::Duplicate(format!(
                    "Agent name '{}' appears at indices {} and {}",
                    agent.name, prev_idx, idx
                )));
            }

            if agent.name.is_empty() {
                errors.push(ValidationError::MissingField(format!("agents[{}].name", idx)));
            } else if agent.name.contains('/') {
                errors.push(ValidationError::InvalidValue {
                    field: format!("agents[{}].name", idx),
                    reason: "Agent names are used as path segments and cannot contain '/'".to_string(),
                });
            }

            if agent.agent_id.is_empty() {
                errors.push(ValidationError::MissingField(format!("agents[{}].agent_id", idx)));
            } else {
                names_by_id.entry(&agent.agent_id).or_default().push(&agent.name);
            }

            if let Some(template) = &agent.prompt_template {
                let mut tera = tera::Tera::default();
                if let Err(e) = tera.add_raw_template(&agent.name, template) {
                    errors.push(ValidationError::InvalidValue {
                        field: format!("agents[{}].prompt_template", idx),
                        reason: e.to_string(),
                    });
                }
            }
        }

        // Several routes sharing one backend agent is allowed but worth surfacing
        for (agent_id, names) in &names_by_id {
            if names.len() > 1 {
                tracing::warn!(
                    "Backend agent '{}' is routed under several names: {}",
                    agent_id,
                    names.join(", ")
                );
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_rate_limit(rate_limit: &RateLimitConfig) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if rate_limit.enabled && rate_limit.requests_per_second == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "rate_limit.requests_per_second".to_string(),
                reason: "Must be greater than 0 when rate limiting is enabled".to_string(),
            });
        }

        if rate_limit.enabled && rate_limit.burst_size == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "rate_limit.burst_size".to_string(),
                reason: "Must be greater than 0 when rate limiting is enabled".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
