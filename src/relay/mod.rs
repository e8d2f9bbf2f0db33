//! Relay endpoint subsystem.
//!
//! # Data Flow
//! ```text
//! Browser request
//!     → handler.rs (method dispatch, admission checks)
//!     → security (origin, secret, size)
//!     → upstream (single POST, bounded by timeouts)
//!     → http::response (mirror status, content type, body)
//! ```
//!
//! # Design Decisions
//! - Stateless per request; the only shared value is an immutable snapshot
//! - Every failure is terminal and rendered as a JSON envelope
//! - One upstream call per request, never retried

pub mod error;
pub mod handler;
pub mod state;

pub use error::RelayError;
pub use handler::relay_handler;
pub use state::RelayState;
