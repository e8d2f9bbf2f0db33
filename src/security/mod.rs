//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming POST:
//!     → access_control.rs (origin/referer allow-list, shared secret)
//!     → limits.rs (declared and actual body size)
//!     → Forward upstream
//!
//! Every response:
//!     → headers.rs (security headers, CORS for allowed origins)
//! ```
//!
//! # Design Decisions
//! - Fail closed: reject on any security check failure
//! - No trust in client input, including Content-Length
//! - Secrets compared in constant time

pub mod access_control;
pub mod headers;
pub mod limits;

pub use access_control::{AccessPolicy, OriginAllowList, SharedSecret, X_PROXY_KEY};
