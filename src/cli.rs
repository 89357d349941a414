use clap::Parser;
use std::path::PathBuf;

/// Agent gateway - HTTP front door for remote conversational agents
#[derive(Parser, Debug, Clone)]
#[command(name = "agent-gateway", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "GATEWAY_CONFIG", default_value = "gateway.toml")]
    pub config: PathBuf,

    /// Server host address
    #[arg(long, env = "GATEWAY_HOST")]
    pub host: Option<String>,

    /// Server port
    #[arg(long, env = "GATEWAY_PORT")]
    pub port: Option<u16>,
}
