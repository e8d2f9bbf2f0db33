//! Network layer subsystem.
//!
//! Plain TCP listeners are bound by the caller and handed to the server.
//! TLS is optional and terminated by axum-server with rustls.

pub mod tls;

pub use tls::load_tls_config;
