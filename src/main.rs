//! gas-proxy
//!
//! ```text
//!     Browser                 ┌──────────────────────────────────────────┐
//!     ───────────────────────▶│  http server → relay handler             │
//!     GET / OPTIONS / POST    │     origin → secret → size → body        │──▶ Upstream
//!                             │                                          │    (fixed URL)
//!     ◀───────────────────────│  mirror status/content-type/body + CORS  │◀──
//!                             └──────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use gas_proxy::config::{load_config, watcher::ConfigWatcher};
use gas_proxy::http::HttpServer;
use gas_proxy::lifecycle::{signals, Shutdown};
use gas_proxy::net::load_tls_config;
use gas_proxy::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "gas-proxy")]
#[command(about = "CORS relay in front of a fixed scripting backend", long_about = None)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "gas_proxy.toml")]
    config: PathBuf,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Reload upstream and access settings when the config file changes.
    #[arg(short, long)]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = load_config(&args.config)?;
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "gas-proxy starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.url,
        allowed_origins = config.access.allowed_origins.len(),
        enforce_origin_check = config.access.enforce_origin_check,
        secret_required = config.access.secret.is_some(),
        follow_redirects = config.upstream.follow_redirects,
        max_body_bytes = config.access.max_body_bytes,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    // Keep the watcher handle alive for the lifetime of the server.
    let (_watcher, config_updates) = if args.watch {
        let (watcher, updates) = ConfigWatcher::new(&args.config);
        (Some(watcher.run()?), updates)
    } else {
        let (_, updates) = mpsc::unbounded_channel();
        (None, updates)
    };

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_termination().await;
        shutdown.trigger();
    });

    let tls = config.listener.tls.clone();
    let bind_address = config.listener.bind_address.clone();
    let server = HttpServer::new(config)?;

    match tls {
        Some(tls) => {
            let addr: SocketAddr = bind_address.parse()?;
            let rustls = load_tls_config(&tls).await?;
            server.run_tls(addr, rustls, config_updates, server_shutdown).await?;
        }
        None => {
            let listener = TcpListener::bind(&bind_address).await?;
            server.run(listener, config_updates, server_shutdown).await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
