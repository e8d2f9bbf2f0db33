//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{header, Request};
use axum::response::Response;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use gas_proxy::config::ProxyConfig;
use gas_proxy::http::HttpServer;
use gas_proxy::lifecycle::Shutdown;

pub const ALLOWED_ORIGIN: &str = "https://app.example.com";
pub const OTHER_ALLOWED_ORIGIN: &str = "https://www.app.example.com";

/// One request as seen by the mock upstream.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub content_type: Option<String>,
    pub body: Bytes,
}

/// Requests received by a mock upstream, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<Recorded>>>);

impl Recorder {
    pub async fn record(&self, request: Request<Body>) {
        let (parts, body) = request.into_parts();
        let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        self.0.lock().unwrap().push(Recorded {
            method: parts.method.to_string(),
            path: parts.uri.path().to_string(),
            content_type: parts
                .headers
                .get(header::CONTENT_TYPE)
                .map(|v| v.to_str().unwrap().to_string()),
            body,
        });
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.0.lock().unwrap().clone()
    }
}

/// Serve `app` on an ephemeral local port and return its address.
pub async fn start_upstream(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// An address nothing listens on.
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Relay config pointed at a plain-HTTP test upstream.
pub fn relay_config(upstream_url: &str) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.upstream.url = upstream_url.into();
    config.upstream.https_only = false;
    config.upstream.system_proxy = false;
    config.access.allowed_origins = vec![ALLOWED_ORIGIN.into(), OTHER_ALLOWED_ORIGIN.into()];
    config
}

/// The layered relay router, for driving with `tower::ServiceExt::oneshot`.
pub fn relay_router(config: ProxyConfig) -> Router {
    HttpServer::new(config).unwrap().router()
}

/// Serve the relay on an ephemeral port. Trigger the returned `Shutdown`
/// to stop it.
pub async fn spawn_relay(config: ProxyConfig) -> (SocketAddr, Shutdown) {
    let shutdown = Shutdown::new();
    let (_, config_updates) = mpsc::unbounded_channel();
    let server = HttpServer::new(config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, config_updates, server_shutdown).await;
    });

    (addr, shutdown)
}

pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap()
}

pub async fn body_bytes(response: Response) -> Bytes {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
