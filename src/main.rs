use agent_gateway::adapters::api_handler::ApiState;
use agent_gateway::adapters::azure_agents::AzureAgentsConnector;
use agent_gateway::adapters::health_handler::HealthHandler;
use agent_gateway::adapters::metrics_handler::{MetricsCollector, MetricsHandler};
use agent_gateway::cli::Cli;
use agent_gateway::config::Settings;
use agent_gateway::conversation::ConversationOrchestrator;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Local .env is optional
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    // Load configuration
    let settings = Settings::new_with_cli(&cli)?;
    let host = settings.server.host.clone();
    let port = settings.server.port;

    info!(
        "Starting agent gateway on {}:{} with {} agent route(s) against {}",
        host,
        port,
        settings.agents.len(),
        settings.backend.endpoint
    );
    if settings.agents.is_empty() {
        warn!("No agent routes configured; every conversation request will be rejected");
    }

    let metrics = Arc::new(MetricsCollector::new()?);
    let connector = Arc::new(AzureAgentsConnector::new(settings.backend.clone()));
    let orchestrator =
        Arc::new(ConversationOrchestrator::new(connector, &settings)?.with_metrics(metrics.clone()));

    let health_handler = Arc::new(HealthHandler::new(orchestrator.clone()));
    let metrics_handler = Arc::new(MetricsHandler::new(metrics));
    let state = ApiState {
        orchestrator,
        settings: Arc::new(settings),
    };

    // Create application using the library function
    let app = agent_gateway::create_app(state, health_handler, metrics_handler);

    // Start server
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
