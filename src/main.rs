//! Contest gateway API server.
//!
//! # Architecture Overview
//!
//! ```text
//!     dApp views                ┌──────────────────────────────────────────┐
//!     ─────────────────────────▶│  http (axum, read-only JSON)             │
//!                               │      │                                   │
//!                               │      ▼                                   │
//!                               │  gateway::ContestGateway                 │
//!                               │      │ view calls, resources             │
//!                               │      ▼                                   │
//!                               │  blockchain::NodeClient ─────────────────┼──▶ fullnode /v1
//!                               └──────────────────────────────────────────┘
//! ```
//!
//! Writes are not served here; they need the user's key and go through
//! `contest-cli` or a wallet.

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use contest_gateway::blockchain::NodeClient;
use contest_gateway::config::resolve_config_with;
use contest_gateway::http::{AppState, HttpServer};
use contest_gateway::observability::{logging, metrics};
use contest_gateway::ContestGateway;

#[derive(Parser)]
#[command(name = "contest-gateway")]
#[command(about = "Read-only API for the mascot naming contest", long_about = None)]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long, env = "CONTEST_CONFIG")]
    config: Option<PathBuf>,

    /// Override the bind address
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = resolve_config_with(args.config.as_deref(), |config| {
        if let Some(bind) = args.bind {
            config.server.bind_address = bind;
        }
    })?;

    logging::init_logging(&config.observability.log_level);
    tracing::info!("contest-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        node_url = %config.network.node_url,
        contract = ?config.contract.address,
        module = %config.contract.module,
        packs = config.packs.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let client = NodeClient::new(config.network.clone()).await?;
    let gateway = ContestGateway::new(client, &config.contract)?;
    let state = AppState::new(gateway, config.packs.clone());

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    let server = HttpServer::new(&config.server, state);
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
