//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router for the relay endpoint
//! - Wire up middleware (tracing, timeout, request ID, security headers)
//! - Serve over plain TCP or TLS with graceful shutdown
//! - Swap in a new relay snapshot when the config is reloaded

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::http::HeaderValue;
use axum::routing::any;
use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ProxyConfig;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::lifecycle::shutdown::wait as shutdown_signal;
use crate::relay::{relay_handler, RelayState};
use crate::security::headers::SECURITY_HEADERS;
use crate::upstream::UpstreamError;

/// How long TLS connections get to drain after shutdown is signalled.
const TLS_DRAIN_GRACE: Duration = Duration::from_secs(10);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    relay: Arc<ArcSwap<RelayState>>,
}

impl AppState {
    pub fn new(relay: RelayState) -> Self {
        Self {
            relay: Arc::new(ArcSwap::from_pointee(relay)),
        }
    }

    /// Snapshot used for the whole of one request.
    pub fn current(&self) -> Arc<RelayState> {
        self.relay.load_full()
    }

    /// Replace the snapshot; in-flight requests keep the old one.
    pub fn replace(&self, relay: RelayState) {
        self.relay.store(Arc::new(relay));
    }
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, UpstreamError> {
        let state = AppState::new(RelayState::from_config(&config)?);
        let router = build_router(&config, state.clone());
        Ok(Self {
            router,
            config,
            state,
        })
    }

    /// The fully layered router, e.g. for driving with `tower::ServiceExt`.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Serve on a bound TCP listener until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: mpsc::UnboundedReceiver<ProxyConfig>,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.url,
            "HTTP server starting"
        );

        let reloader = tokio::spawn(apply_config_updates(self.state.clone(), config_updates));

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await?;

        reloader.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Serve with TLS termination until `shutdown` fires.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        config_updates: mpsc::UnboundedReceiver<ProxyConfig>,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.url,
            "HTTPS server starting"
        );

        let reloader = tokio::spawn(apply_config_updates(self.state.clone(), config_updates));

        let handle = axum_server::Handle::new();
        let drain = handle.clone();
        tokio::spawn(async move {
            shutdown_signal(shutdown).await;
            drain.graceful_shutdown(Some(TLS_DRAIN_GRACE));
        });

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        reloader.abort();
        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(config: &ProxyConfig, state: AppState) -> Router {
    let mut router = Router::new()
        .route("/", any(relay_handler))
        .route("/{*path}", any(relay_handler))
        .with_state(state)
        .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)));

    for (name, value) in SECURITY_HEADERS {
        router = router.layer(SetResponseHeaderLayer::overriding(
            name,
            HeaderValue::from_static(value),
        ));
    }

    router
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(set_request_id_layer())
}

/// Rebuild the relay snapshot for every reloaded config. Listener settings
/// are not reloadable and changes to them are ignored.
async fn apply_config_updates(state: AppState, mut updates: mpsc::UnboundedReceiver<ProxyConfig>) {
    while let Some(config) = updates.recv().await {
        match RelayState::from_config(&config) {
            Ok(relay) => {
                state.replace(relay);
                tracing::info!(upstream = %config.upstream.url, "Relay configuration reloaded");
            }
            Err(e) => {
                tracing::error!(error = %e, "Rejected reloaded configuration, keeping current");
            }
        }
    }
}
