//! Server mode CLI logic
//!
//! Startup order: logging, settings store, queues plugin, listener.

use crate::{
    AmqpClient, ConfigLoader, Error, QueuesPlugin, Store,
    server::app,
    utils::version,
};
use anyhow::{Context, Result};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*, reload};

/// Handle for raising the log level once settings are known
type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// Arguments for server mode
#[derive(Debug)]
pub struct ServerArgs {
    pub port: u16,
    pub host: String,
    pub local_config: PathBuf,
    pub broker_timeout: Duration,
    pub verbose: bool,
}

/// Run server mode with the given arguments
pub async fn run_server_mode(args: ServerArgs) -> Result<()> {
    let filter_handle = init_logging(args.verbose);

    let store = ConfigLoader::new()
        .with_local_file(&args.local_config)
        .load()
        .context("Failed to load configuration")?;

    if !args.verbose && debug_enabled(&store) {
        if let Some(handle) = filter_handle {
            if let Err(e) = handle.reload(EnvFilter::new(log_level(true))) {
                tracing::warn!("Could not raise log level to debug: {}", e);
            }
        }
    }

    tracing::info!(
        "Starting tag publisher v{} ({} environment)",
        version::get_version(),
        store.env().unwrap_or("default")
    );

    let plugin = QueuesPlugin::new(AmqpClient::new()).with_timeout(args.broker_timeout);
    let routes = plugin
        .register(app::routes(), &store)
        .await
        .context("Queues plugin registration failed")?;
    let app = app::create_app(routes, Arc::new(store));

    let addr = resolve_bind_address(&args.host, args.port).await?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::server(format!("failed to bind {}: {}", addr, e)))?;
    tracing::info!(
        "Tag publisher v{} listening on {}",
        version::get_version(),
        listener.local_addr()?
    );

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::server(format!("server stopped: {}", e)))?;
    Ok(())
}

/// Whether the settings store asks for debug logging
pub fn debug_enabled(store: &Store) -> bool {
    store
        .get("/logging/debug")
        .and_then(|debug| debug.as_bool())
        .unwrap_or(false)
}

fn log_level(debug: bool) -> &'static str {
    if debug { "debug" } else { "info" }
}

/// Install the stderr subscriber before anything else logs
///
/// Returns a reload handle unless `RUST_LOG` fixed the filter or another
/// subscriber was already installed.
fn init_logging(verbose: bool) -> Option<FilterHandle> {
    let (filter, from_env) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, true),
        Err(_) => (EnvFilter::new(log_level(verbose)), false),
    };
    let (filter, handle) = reload::Layer::new(filter);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .ok()?;

    (!from_env).then_some(handle)
}

/// Turn the host argument into a socket address
///
/// `::` falls back to `0.0.0.0` on hosts without IPv6 support.
pub async fn resolve_bind_address(host: &str, port: u16) -> Result<SocketAddr> {
    let ip: IpAddr = host.parse().with_context(|| {
        format!("Invalid host address: {host}. Use an IP literal such as '::' or '0.0.0.0'")
    })?;

    if ip != IpAddr::V6(Ipv6Addr::UNSPECIFIED) {
        return Ok(SocketAddr::new(ip, port));
    }

    let addr = SocketAddr::new(ip, port);
    match tokio::net::TcpListener::bind(addr).await {
        Ok(_) => Ok(addr),
        Err(e) => {
            tracing::warn!(
                "Could not listen on [::]:{} (Caused by {}), falling back to 0.0.0.0",
                port,
                e
            );
            Ok(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port))
        }
    }
}
