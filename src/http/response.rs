//! Response construction.
//!
//! # Responsibilities
//! - Render the `{success, message|error}` JSON envelope
//! - Mirror an upstream reply: status, content type, body bytes
//!
//! # Design Decisions
//! - Upstream bodies are written through untouched, never parsed
//! - Upstream 4xx/5xx are relayed as-is, not mapped to relay errors
//! - Envelopes never carry internal error detail

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::upstream::UpstreamResponse;

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

pub const ALIVE_MESSAGE: &str = "gas_proxy alive";

#[derive(Debug, Serialize)]
struct Envelope<'a> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

fn json_response(status: StatusCode, envelope: &Envelope<'_>) -> Response {
    let body = match serde_json::to_vec(envelope) {
        Ok(body) => body,
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize response envelope");
            br#"{"success":false}"#.to_vec()
        }
    };
    (
        status,
        [(header::CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))],
        body,
    )
        .into_response()
}

/// `{"success":false,"error":<message>}` with the given status.
pub fn error_envelope(status: StatusCode, message: &str) -> Response {
    json_response(
        status,
        &Envelope {
            success: false,
            message: None,
            error: Some(message),
        },
    )
}

/// Liveness probe reply.
pub fn alive() -> Response {
    json_response(
        StatusCode::OK,
        &Envelope {
            success: true,
            message: Some(ALIVE_MESSAGE),
            error: None,
        },
    )
}

/// Preflight reply; CORS headers are added by the caller.
pub fn preflight() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

/// Mirror an upstream reply. A missing content type defaults to JSON.
pub fn passthrough(upstream: UpstreamResponse) -> Response {
    let content_type = upstream
        .content_type
        .unwrap_or_else(|| HeaderValue::from_static(JSON_CONTENT_TYPE));

    let mut response = Response::new(Body::from(upstream.body));
    *response.status_mut() = upstream.status;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, content_type);
    response
}
