//! Kinship server binary
//!
//! Starts the family tree HTTP API.

use clap::Parser;
use kinship_server::{config::ServerConfig, start_server, ServerError};
use std::path::PathBuf;
use std::process;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Family tree API server
#[derive(Debug, Parser)]
#[command(name = "kinship-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Load configuration from a TOML file
    #[arg(short, long, env = "KINSHIP_CONFIG")]
    config: Option<PathBuf>,

    /// Override the bind port
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the SQLite database path
    #[arg(long)]
    database: Option<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run(Args::parse()).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), ServerError> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::from_file(path)?,
        None => {
            warn!("No config file specified, using default test configuration");
            let mut config = ServerConfig::default_test_config();
            config.database_path = "kinship.db".to_string();
            config
        }
    };

    if let Some(port) = args.port {
        config.bind_port = port;
    }
    if let Some(database) = args.database {
        config.database_path = database;
    }

    start_server(config).await
}
