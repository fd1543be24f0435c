//! Hardened static page server.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────────┐
//!                 │                     SERVER                           │
//!                 │                                                      │
//!   Request       │  ┌───────────┐   ┌────────────┐   ┌──────────────┐   │
//!   ──────────────┼─▶│ hardening │──▶│ trace +    │──▶│ pages        │   │
//!                 │  │ (capture) │   │ timeout    │   │ GET / | 404  │   │
//!                 │  └───────────┘   └────────────┘   └──────┬───────┘   │
//!                 │                                          │           │
//!   Response      │  ┌───────────┐                           │           │
//!   ◀─────────────┼──│ hardening │◀──────────────────────────┘           │
//!                 │  │ (headers, │──▶ audit ──▶ rotating security.log    │
//!                 │  │  audit)   │                                       │
//!                 │  └───────────┘                                       │
//!                 └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use hardened_page::config::load_config;
use hardened_page::http::{HttpServer, ResponseHardening};
use hardened_page::lifecycle::{signals, Shutdown};
use hardened_page::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "hardened-page", about = "Static page server with hardened response headers")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "HARDENED_PAGE_CONFIG")]
    config: Option<PathBuf>,

    /// Validate the configuration and exit
    #[arg(long)]
    check_config: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    if cli.check_config {
        println!("configuration ok");
        return Ok(());
    }

    let logging = logging::init(&config.logging)?;

    tracing::info!("hardened-page v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        audit_log = %logging.audit_path().display(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let hardening = Arc::new(ResponseHardening::from_config(&config.security)?);

    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(address = %local_addr, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        shutdown.trigger();
    });

    let server = HttpServer::new(&config, hardening);
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
