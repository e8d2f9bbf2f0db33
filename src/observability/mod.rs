//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Relay handler produces:
//!     → logging.rs (structured log events, per-request spans via TraceLayer)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout / log aggregation
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every log event of a request
//! - Metric updates are no-ops until an exporter is installed
//! - Upstream error detail goes to logs only, never to callers

pub mod logging;
pub mod metrics;
