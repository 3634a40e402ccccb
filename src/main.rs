//! Resume agent server.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌───────────────────────────────────────────────┐
//!                         │                 RESUME AGENT                  │
//!                         │                                               │
//!   Peer agent / browser  │  ┌──────────┐   ┌────────────┐   ┌─────────┐  │
//!   ──────────────────────┼─▶│  http    │──▶│  security  │──▶│  a2a    │  │
//!                         │  │  server  │   │ admission  │   │ handler │  │
//!                         │  └──────────┘   └────────────┘   └────┬────┘  │
//!                         │                                       │       │
//!                         │                                       ▼       │
//!                         │                               ┌────────────┐  │   GET /.well-known/
//!                         │                               │  identity  │──┼──▶ agent.json
//!                         │                               │ card cache │  │   (peer)
//!                         │                               └────────────┘  │
//!                         │  config · observability · lifecycle           │
//!                         └───────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use resume_agent::config::{load_config, AgentConfig, ConfigWatcher};
use resume_agent::lifecycle::{watch_signals, Shutdown};
use resume_agent::observability::{logging, metrics};
use resume_agent::HttpServer;

#[derive(Parser)]
#[command(name = "resume-agent")]
#[command(about = "A2A resume agent with request admission control", long_about = None)]
struct Args {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => AgentConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "resume-agent starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        per_minute = config.rate_limit.max_requests_per_minute,
        per_day = config.rate_limit.max_requests_per_day,
        global = config.rate_limit.global_limit,
        identity_enabled = config.identity.enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // The watcher must outlive the server.
    let (_watcher, config_updates) = match &args.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            match watcher.run() {
                Ok(w) => (Some(w), updates),
                Err(e) => {
                    tracing::warn!(error = %e, "Config hot reload unavailable");
                    (None, updates)
                }
            }
        }
        None => (None, mpsc::unbounded_channel().1),
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    tokio::spawn(watch_signals(shutdown.clone()));

    let server = HttpServer::new(config)?;
    server.run(listener, config_updates, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
