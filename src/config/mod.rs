use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

pub mod validator;

use crate::cli::Cli;
use crate::conversation::config::{AgentRouteConfig, PollingSettings, RetrySettings};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub backend: BackendSettings,
    #[serde(default)]
    pub polling: PollingSettings,
    #[serde(default)]
    pub retry: RetrySettings,
    /// Route table mapping logical agent names to backend agent ids
    #[serde(default)]
    pub agents: Vec<AgentRouteConfig>,
    #[serde(default)]
    pub rate_limit: Option<RateLimitConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Maximum accepted request body size
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
    /// Maximum chatbot message length, in characters, after trimming
    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: usize,
}

fn default_body_limit() -> usize {
    10 * 1024 * 1024
}

fn default_max_message_chars() -> usize {
    1000
}

/// Connection details for the remote agent service
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BackendSettings {
    /// Project endpoint, e.g. "https://<resource>.services.ai.azure.com/api/projects/<project>"
    pub endpoint: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default)]
    pub auth_scheme: AuthScheme,
    /// Environment variable holding the credential
    #[serde(default = "default_credential_env")]
    pub credential_env: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_api_version() -> String {
    "v1".to_string()
}

fn default_credential_env() -> String {
    "AZURE_AI_AGENTS_TOKEN".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

/// How the credential is presented to the agent service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuthScheme {
    /// `Authorization: Bearer <token>`
    #[default]
    Bearer,
    /// `api-key: <key>`
    ApiKey,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub requests_per_second: u32,
    pub burst_size: u32,
}

impl Settings {
    pub fn new() -> Result<Self, anyhow::Error> {
        Self::from_root(".")
    }

    /// Create settings from CLI arguments (includes config file and CLI overrides)
    pub fn new_with_cli(cli: &Cli) -> Result<Self, anyhow::Error> {
        let config_path = &cli.config;
        let root = config_path
            .parent()
            .and_then(|p| p.to_str())
            .filter(|p| !p.is_empty())
            .unwrap_or(".");

        let s = Self::builder(File::from(config_path.clone()).required(false))?;
        let mut settings: Settings = s.try_deserialize()?;

        // CLI > env vars > config file
        settings.apply_cli_overrides(cli);
        settings.finish(root)?;

        Ok(settings)
    }

    pub fn from_root(root: &str) -> Result<Self, anyhow::Error> {
        let config_path = std::path::Path::new(root).join("gateway");
        let s = Self::builder(File::from(config_path).required(false))?;
        let mut settings: Settings = s.try_deserialize()?;
        settings.finish(root)?;
        Ok(settings)
    }

    fn builder(file: impl config::Source + Send + Sync + 'static) -> Result<Config, anyhow::Error> {
        Ok(Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix("GATEWAY").separator("__"))
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .build()?)
    }

    fn finish(&mut self, root: &str) -> Result<(), anyhow::Error> {
        self.load_agents_from_dir(&format!("{}/config/agents", root))?;

        validator::ConfigValidator::validate(self).map_err(|errors| {
            let error_messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            anyhow::anyhow!(
                "Configuration validation failed:\n{}",
                error_messages.join("\n")
            )
        })
    }

    fn apply_cli_overrides(&mut self, cli: &Cli) {
        if let Some(host) = &cli.host {
            self.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.server.port = port;
        }
    }

    fn load_agents_from_dir(&mut self, path: &str) -> Result<(), anyhow::Error> {
        let pattern = format!("{}/*", path);
        for entry in glob::glob(&pattern)? {
            match entry {
                Ok(path) => {
                    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
                        if matches!(ext, "json" | "yaml" | "yml" | "toml") {
                            let content = std::fs::read_to_string(&path)?;
                            let route: AgentRouteConfig = match ext {
                                "json" => serde_json::from_str(&content)?,
                                "toml" => toml::from_str(&content)?,
                                _ => serde_yaml::from_str(&content)?,
                            };
                            tracing::debug!("Loaded agent route '{}' from {}", route.name, path.display());
                            self.agents.push(route);
                        }
                    }
                }
                Err(e) => tracing::warn!("Failed to read glob entry: {}", e),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
impl Settings {
    /// Loopback server, no agents, no retries, polling every second without a deadline
    pub(crate) fn for_tests() -> Self {
        Settings {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 8080,
                body_limit_bytes: default_body_limit(),
                max_message_chars: default_max_message_chars(),
            },
            backend: BackendSettings {
                endpoint: "https://example.services.ai.azure.com/api/projects/demo".to_string(),
                api_version: default_api_version(),
                auth_scheme: AuthScheme::Bearer,
                credential_env: default_credential_env(),
                request_timeout_secs: default_request_timeout(),
            },
            polling: PollingSettings {
                interval_ms: 1000,
                max_wait_secs: 0,
            },
            retry: RetrySettings::disabled(),
            agents: vec![],
            rate_limit: None,
        }
    }
}
