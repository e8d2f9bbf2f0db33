//! Caller admission: origin allow-list and shared secret.

use std::fmt;

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};
use constant_time_eq::constant_time_eq;

use crate::config::AccessConfig;
use crate::http::request::header_str;
use crate::relay::error::RelayError;

/// Header carrying the caller's copy of the shared secret.
pub const X_PROXY_KEY: &str = "x-proxy-key";

/// Exact-match list of origins permitted to call the relay.
#[derive(Debug, Clone, Default)]
pub struct OriginAllowList {
    origins: Vec<String>,
}

impl OriginAllowList {
    pub fn new(origins: Vec<String>) -> Self {
        Self { origins }
    }

    /// Whether an `Origin` header value is allow-listed.
    pub fn contains(&self, origin: &str) -> bool {
        self.origins.iter().any(|allowed| allowed == origin)
    }

    /// Whether a `Referer` starts with an allow-listed origin.
    ///
    /// The prefix must end on an origin boundary, so `https://site.com.evil`
    /// does not pass for `https://site.com`.
    pub fn admits_referer(&self, referer: &str) -> bool {
        self.origins.iter().any(|allowed| {
            referer.strip_prefix(allowed.as_str()).is_some_and(|rest| {
                rest.is_empty() || rest.starts_with(['/', '?', '#'])
            })
        })
    }

    /// Origin check for a relay call.
    ///
    /// A present `Origin` must match exactly. Without one, a present
    /// `Referer` must match by prefix. Requests carrying neither pass.
    pub fn admits(&self, origin: Option<&str>, referer: Option<&str>) -> bool {
        match (origin, referer) {
            (Some(origin), _) => self.contains(origin),
            (None, Some(referer)) => self.admits_referer(referer),
            (None, None) => true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }
}

/// Static token callers present in `X-Proxy-Key`.
#[derive(Clone)]
pub struct SharedSecret(String);

impl SharedSecret {
    /// Returns `None` for an empty value, which disables the check.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    /// Constant-time comparison against the presented key.
    pub fn verify(&self, presented: Option<&str>) -> bool {
        constant_time_eq(self.0.as_bytes(), presented.unwrap_or_default().as_bytes())
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(<redacted>)")
    }
}

/// Admission policy derived from [`AccessConfig`].
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    origins: OriginAllowList,
    enforce_origin_check: bool,
    secret: Option<SharedSecret>,
    max_body_bytes: usize,
}

impl AccessPolicy {
    pub fn from_config(config: &AccessConfig) -> Self {
        Self {
            origins: OriginAllowList::new(config.allowed_origins.clone()),
            enforce_origin_check: config.enforce_origin_check,
            secret: config.secret.clone().and_then(SharedSecret::new),
            max_body_bytes: config.max_body_bytes,
        }
    }

    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }

    pub fn requires_secret(&self) -> bool {
        self.secret.is_some()
    }

    /// Reject callers whose Origin/Referer is not allow-listed.
    pub fn check_origin(&self, headers: &HeaderMap) -> Result<(), RelayError> {
        if !self.enforce_origin_check {
            return Ok(());
        }
        let origin = admission_header(headers, header::ORIGIN)?;
        let referer = admission_header(headers, header::REFERER)?;
        if self.origins.admits(origin, referer) {
            Ok(())
        } else {
            Err(RelayError::Forbidden)
        }
    }

    /// Reject callers without the shared secret, when one is configured.
    pub fn check_secret(&self, headers: &HeaderMap) -> Result<(), RelayError> {
        match &self.secret {
            Some(secret) if !secret.verify(header_str(headers, X_PROXY_KEY)) => {
                Err(RelayError::Unauthorized)
            }
            _ => Ok(()),
        }
    }

    /// The `Origin` to echo in CORS headers, if it is allow-listed.
    pub fn cors_origin(&self, headers: &HeaderMap) -> Option<HeaderValue> {
        let origin = headers.get(header::ORIGIN)?;
        let allowed = origin
            .to_str()
            .is_ok_and(|value| !value.is_empty() && self.origins.contains(value));
        allowed.then(|| origin.clone())
    }
}

/// An Origin or Referer as text. Missing or empty is `None`; a value that
/// is present but not visible ASCII can never match and is refused.
fn admission_header(headers: &HeaderMap, name: HeaderName) -> Result<Option<&str>, RelayError> {
    match headers.get(name).map(HeaderValue::to_str) {
        None | Some(Ok("")) => Ok(None),
        Some(Ok(value)) => Ok(Some(value)),
        Some(Err(_)) => Err(RelayError::Forbidden),
    }
}
