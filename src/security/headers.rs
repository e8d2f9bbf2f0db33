//! Security and CORS response headers.

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

/// Headers stamped on every response. The relay is an API endpoint: nothing
/// it returns may be cached, sniffed, or leak the caller's referrer.
pub const SECURITY_HEADERS: [(HeaderName, &str); 3] = [
    (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (header::REFERRER_POLICY, "no-referrer"),
    (header::CACHE_CONTROL, "no-store"),
];

pub const CORS_ALLOW_METHODS: &str = "POST, OPTIONS, GET";
pub const CORS_ALLOW_HEADERS: &str = "Content-Type, X-Proxy-Key";

/// Echo an allow-listed origin back with the fixed CORS grant.
pub fn apply_cors(headers: &mut HeaderMap, origin: HeaderValue) {
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    headers.insert(header::VARY, HeaderValue::from_static("Origin"));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(CORS_ALLOW_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(CORS_ALLOW_HEADERS),
    );
}
