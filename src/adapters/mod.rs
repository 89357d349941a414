pub mod api_handler;
pub mod azure_agents;
pub mod health_handler;
pub mod metrics_handler;
pub mod rate_limit;
