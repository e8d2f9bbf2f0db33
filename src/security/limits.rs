//! Request body limits.
//!
//! The declared `Content-Length` is checked before any byte is read, then the
//! actual length is enforced while streaming, since the declaration is
//! untrusted.

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap};
use futures_util::StreamExt;

use crate::http::request::header_str;
use crate::relay::error::RelayError;

/// Declared body length, if the header is present and numeric.
pub fn declared_length(headers: &HeaderMap) -> Option<u64> {
    header_str(headers, header::CONTENT_LENGTH)?.trim().parse().ok()
}

/// Reject a declared length above `max` bytes.
pub fn check_declared_length(headers: &HeaderMap, max: usize) -> Result<(), RelayError> {
    match declared_length(headers) {
        Some(len) if len > max as u64 => Err(RelayError::PayloadTooLarge),
        _ => Ok(()),
    }
}

/// Read the whole body, failing as soon as it exceeds `max` bytes.
///
/// An empty or unreadable body is reported as [`RelayError::EmptyBody`].
pub async fn read_body(body: Body, max: usize, size_hint: Option<u64>) -> Result<Bytes, RelayError> {
    let capacity = size_hint
        .and_then(|hint| usize::try_from(hint).ok())
        .unwrap_or(0)
        .min(max);
    let mut buf = Vec::with_capacity(capacity);
    let mut stream = body.into_data_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| {
            tracing::debug!(error = %e, "Failed to read request body");
            RelayError::EmptyBody
        })?;
        if buf.len() + chunk.len() > max {
            return Err(RelayError::PayloadTooLarge);
        }
        buf.extend_from_slice(&chunk);
    }

    if buf.is_empty() {
        return Err(RelayError::EmptyBody);
    }
    Ok(Bytes::from(buf))
}
