//! Tag publisher server binary
//!
//! Loads the settings store, registers the queues plugin and serves the
//! HTTP API.
//!
//! # Usage
//!
//! ```bash
//! tag-publisher --port 8000 --host 0.0.0.0
//! ```
//!
//! # API Endpoints
//!
//! - `GET /ping`: Health check endpoint
//! - `POST /tag_updates`: Publish a tag update to the `tag.updates` exchange

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tag_publisher::cli::{ServerArgs, run_server_mode};

/// HTTP server publishing tag updates to the message broker
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Port to listen on
    #[arg(short, long, default_value = "8000")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "::")]
    host: String,

    /// Local override file read outside production
    #[arg(long, default_value = "config.local.toml")]
    local_config: PathBuf,

    /// Seconds to wait for the broker connection and exchange
    #[arg(long, default_value = "30")]
    broker_timeout: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl From<Cli> for ServerArgs {
    fn from(cli: Cli) -> Self {
        Self {
            port: cli.port,
            host: cli.host,
            local_config: cli.local_config,
            broker_timeout: Duration::from_secs(cli.broker_timeout),
            verbose: cli.verbose,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    run_server_mode(Cli::parse().into()).await
}
