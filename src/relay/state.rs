//! Per-configuration relay snapshot.

use crate::config::ProxyConfig;
use crate::security::AccessPolicy;
use crate::upstream::{UpstreamClient, UpstreamError};

/// Everything a request needs, built once per loaded config and shared
/// read-only across requests.
#[derive(Debug, Clone)]
pub struct RelayState {
    pub access: AccessPolicy,
    pub upstream: UpstreamClient,
}

impl RelayState {
    pub fn from_config(config: &ProxyConfig) -> Result<Self, UpstreamError> {
        Ok(Self {
            access: AccessPolicy::from_config(&config.access),
            upstream: UpstreamClient::from_config(&config.upstream)?,
        })
    }
}
