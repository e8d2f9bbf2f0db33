//! Browser-facing relay to a fixed scripting backend.
//!
//! Accepts a request from a web page, checks its origin and optional shared
//! secret, POSTs the raw body to one configured upstream URL and mirrors the
//! reply with CORS headers added.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod relay;
pub mod security;
pub mod upstream;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use relay::RelayError;
