//! Discovery Gateway
//!
//! A single-hop API gateway that resolves backends from Consul on every request.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────────────┐
//!                         │                  DISCOVERY GATEWAY                   │
//!                         │                                                      │
//!     Client Request      │  ┌─────────┐    ┌──────────┐    ┌──────────────┐     │
//!     ────────────────────┼─▶│  http   │───▶│ routing  │───▶│  discovery   │─────┼──▶ Consul
//!                         │  │ server  │    │  table   │    │  (resolve)   │     │
//!                         │  └─────────┘    └──────────┘    └──────┬───────┘     │
//!                         │                                        │             │
//!                         │                                        ▼             │
//!                         │                                 ┌──────────────┐     │
//!                         │                                 │load_balancer │     │
//!                         │                                 │ round robin  │     │
//!                         │                                 └──────┬───────┘     │
//!                         │                                        │             │
//!                         │                                        ▼             │
//!     Client Response     │  ┌─────────┐                    ┌──────────────┐     │
//!     ◀───────────────────┼──│response │◀───────────────────│  forwarder   │◀────┼─── Instance
//!                         │  │ relay   │                    │ (one attempt)│     │
//!                         │  └─────────┘                    └──────────────┘     │
//!                         └──────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use clap::Parser;
use tokio::net::TcpListener;

use discovery_gateway::config::load_config;
use discovery_gateway::lifecycle::signals::forward_signals;
use discovery_gateway::observability::{logging, metrics};
use discovery_gateway::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "discovery-gateway")]
#[command(about = "API gateway with per-request service discovery", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    logging::init_logging(&config.observability);
    tracing::info!("discovery-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        registry = %config.registry.base_url,
        routes = config.routes.len(),
        upstream_timeout_secs = config.timeouts.upstream_secs,
        retries = config.retries.enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics endpoint");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config)?;
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(forward_signals(shutdown));

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
