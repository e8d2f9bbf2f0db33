//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, header access)
//!     → relay::handler (admission, forwarding)
//!     → response.rs (envelopes, upstream pass-through)
//!     → security headers + request ID stamped on the way out
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestIdExt, X_REQUEST_ID};
pub use server::{build_router, AppState, HttpServer};
