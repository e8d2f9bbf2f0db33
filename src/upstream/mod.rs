//! Upstream forwarding.
//!
//! A single fixed endpoint, one call per inbound request: no retries, no
//! caching, no circuit breaking. Redirect and timeout policy come from
//! `[upstream]` in the config.

pub mod client;

pub use client::{UpstreamClient, UpstreamError, UpstreamResponse, FORWARD_CONTENT_TYPE};
