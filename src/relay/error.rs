//! Request-level error taxonomy.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::http::response::error_envelope;
use crate::upstream::UpstreamError;

/// Terminal outcome of a rejected or failed relay call.
///
/// `Display` is the caller-facing message. Upstream detail stays in the
/// error source and is only ever logged.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Forbidden")]
    Forbidden,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Payload too large")]
    PayloadTooLarge,

    #[error("Empty body")]
    EmptyBody,

    #[error("Upstream request failed")]
    Upstream(#[source] UpstreamError),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            RelayError::Forbidden => StatusCode::FORBIDDEN,
            RelayError::Unauthorized => StatusCode::UNAUTHORIZED,
            RelayError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            RelayError::EmptyBody => StatusCode::BAD_REQUEST,
            RelayError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Short label for metrics and logs.
    pub fn reason(&self) -> &'static str {
        match self {
            RelayError::MethodNotAllowed => "method_not_allowed",
            RelayError::Forbidden => "forbidden",
            RelayError::Unauthorized => "unauthorized",
            RelayError::PayloadTooLarge => "payload_too_large",
            RelayError::EmptyBody => "empty_body",
            RelayError::Upstream(_) => "upstream",
        }
    }
}

impl From<UpstreamError> for RelayError {
    fn from(err: UpstreamError) -> Self {
        RelayError::Upstream(err)
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        error_envelope(self.status(), &self.to_string())
    }
}
