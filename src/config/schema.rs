//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Default cap on inbound bodies (25 MiB). Payloads are often base64 PDFs.
pub const DEFAULT_MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Environment variable read for the shared secret unless overridden.
pub const DEFAULT_SECRET_ENV: &str = "GAS_PROXY_KEY";

/// Root configuration for the relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// The single upstream the relay forwards to.
    pub upstream: UpstreamConfig,

    /// Caller admission: origins, shared secret, body cap.
    pub access: AccessConfig,

    /// Server-side timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Upstream endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Fixed URL every relayed body is POSTed to.
    pub url: String,

    /// Follow upstream redirects instead of relaying the 3xx.
    pub follow_redirects: bool,

    /// Maximum number of redirects followed when `follow_redirects` is set.
    pub max_redirects: usize,

    /// Refuse any non-HTTPS target, including redirect targets.
    pub https_only: bool,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Total upstream call budget in seconds.
    pub request_timeout_secs: u64,

    /// Honor HTTP(S)_PROXY environment variables for the upstream call.
    pub system_proxy: bool,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            follow_redirects: true,
            max_redirects: 3,
            https_only: true,
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            system_proxy: true,
        }
    }
}

/// Caller admission configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AccessConfig {
    /// Origins allowed to call the relay and to receive CORS headers.
    pub allowed_origins: Vec<String>,

    /// Reject POSTs whose Origin/Referer does not match the allow-list.
    pub enforce_origin_check: bool,

    /// Inline shared secret. Takes precedence over `secret_env`.
    #[serde(skip_serializing)]
    pub secret: Option<String>,

    /// Name of the environment variable holding the shared secret.
    pub secret_env: String,

    /// Maximum accepted body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            enforce_origin_check: true,
            secret: None,
            secret_env: DEFAULT_SECRET_ENV.to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// Server-side timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Whole inbound request budget in seconds. Must exceed the upstream
    /// total timeout so upstream failures surface as 502, not 408.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 45 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit ANSI colors in log output.
    pub ansi: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            ansi: true,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
