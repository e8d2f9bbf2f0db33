//! Configuration validation.
//!
//! Semantic checks only; serde handles the syntax. Every problem is reported,
//! not just the first one, so an operator can fix a config in one pass.

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;

/// Upper bound for `upstream.max_redirects`.
pub const MAX_REDIRECT_LIMIT: usize = 10;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    BindAddress(String),

    #[error("listener.tls requires both cert_path and key_path")]
    TlsPaths,

    #[error("upstream.url is not set")]
    MissingUpstream,

    #[error("upstream.url `{url}` is invalid: {reason}")]
    UpstreamUrl { url: String, reason: String },

    #[error("upstream.url `{0}` must use https while upstream.https_only is set")]
    InsecureUpstream(String),

    #[error("upstream.{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("upstream.connect_timeout_secs ({connect}) exceeds request_timeout_secs ({total})")]
    ConnectExceedsTotal { connect: u64, total: u64 },

    #[error("upstream.max_redirects ({0}) exceeds the limit of {limit}", limit = MAX_REDIRECT_LIMIT)]
    TooManyRedirects(usize),

    #[error("access.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,

    #[error("access.allowed_origins entry `{0}` must be a bare scheme://host[:port]")]
    MalformedOrigin(String),

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("timeouts.request_secs ({request}) must exceed upstream.request_timeout_secs ({upstream})")]
    RequestTimeoutTooShort { request: u64, upstream: u64 },
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if let Some(tls) = &config.listener.tls {
        if tls.cert_path.is_empty() || tls.key_path.is_empty() {
            errors.push(ValidationError::TlsPaths);
        }
    }

    validate_upstream(config, &mut errors);

    if config.access.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }
    for origin in &config.access.allowed_origins {
        if !is_bare_origin(origin) {
            errors.push(ValidationError::MalformedOrigin(origin.clone()));
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    } else if config.timeouts.request_secs <= config.upstream.request_timeout_secs {
        // Otherwise the server timeout answers a bare 408 before the
        // upstream call can fail as a 502.
        errors.push(ValidationError::RequestTimeoutTooShort {
            request: config.timeouts.request_secs,
            upstream: config.upstream.request_timeout_secs,
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_upstream(config: &ProxyConfig, errors: &mut Vec<ValidationError>) {
    let upstream = &config.upstream;

    if upstream.url.is_empty() {
        errors.push(ValidationError::MissingUpstream);
    } else {
        match Url::parse(&upstream.url) {
            Ok(url) => {
                if upstream.https_only && url.scheme() != "https" {
                    errors.push(ValidationError::InsecureUpstream(upstream.url.clone()));
                }
            }
            Err(e) => errors.push(ValidationError::UpstreamUrl {
                url: upstream.url.clone(),
                reason: e.to_string(),
            }),
        }
    }

    if upstream.connect_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("connect_timeout_secs"));
    }
    if upstream.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request_timeout_secs"));
    }
    if upstream.connect_timeout_secs > upstream.request_timeout_secs {
        errors.push(ValidationError::ConnectExceedsTotal {
            connect: upstream.connect_timeout_secs,
            total: upstream.request_timeout_secs,
        });
    }
    if upstream.max_redirects > MAX_REDIRECT_LIMIT {
        errors.push(ValidationError::TooManyRedirects(upstream.max_redirects));
    }
}

/// An Origin header value is `scheme://host[:port]` with nothing after it.
/// Browsers never send a path or trailing slash, so such an entry could
/// never match.
fn is_bare_origin(origin: &str) -> bool {
    let Ok(url) = Url::parse(origin) else {
        return false;
    };
    if url.host_str().is_none() || !url.username().is_empty() || url.password().is_some() {
        return false;
    }
    url.origin().ascii_serialization() == origin
}
