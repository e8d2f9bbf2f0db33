//! The relay endpoint.
//!
//! ```text
//! GET      → liveness envelope (+ CORS)
//! OPTIONS  → 204 (+ CORS)
//! POST     → origin → secret → declared length → body → upstream (+ CORS)
//! other    → 405
//! ```

use std::time::Instant;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Method, Request};
use axum::response::{IntoResponse, Response};

use crate::http::request::RequestIdExt;
use crate::http::response;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::relay::error::RelayError;
use crate::relay::state::RelayState;
use crate::security::headers::apply_cors;
use crate::security::limits;

/// Axum handler for every relay path.
pub async fn relay_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let relay = state.current();
    let method = request.method().clone();
    let request_id = request.request_id().to_owned();

    tracing::debug!(request_id = %request_id, method = %method, "Relay request");

    let response = match method {
        Method::GET => with_cors(&relay, request.headers(), response::alive()),
        Method::OPTIONS => with_cors(&relay, request.headers(), response::preflight()),
        Method::POST => relay_post(&relay, request, &request_id).await,
        _ => reject(RelayError::MethodNotAllowed, &request_id),
    };

    metrics::record_request(method.as_str(), response.status().as_u16(), start_time);
    response
}

async fn relay_post(relay: &RelayState, request: Request<Body>, request_id: &str) -> Response {
    let (parts, body) = request.into_parts();

    if let Err(e) = relay.access.check_origin(&parts.headers) {
        return reject(e, request_id);
    }

    let response = match forward(relay, &parts.headers, body).await {
        Ok(response) => response,
        Err(e) => reject(e, request_id),
    };
    with_cors(relay, &parts.headers, response)
}

async fn forward(relay: &RelayState, headers: &HeaderMap, body: Body) -> Result<Response, RelayError> {
    relay.access.check_secret(headers)?;

    let max = relay.access.max_body_bytes();
    limits::check_declared_length(headers, max)?;
    let payload = limits::read_body(body, max, limits::declared_length(headers)).await?;
    let payload_len = payload.len();

    let start_time = Instant::now();
    let result = relay.upstream.forward(payload).await;
    metrics::record_upstream(start_time.elapsed(), result.as_ref().err().map(|e| e.kind()));
    let upstream = result?;

    tracing::debug!(
        bytes_out = payload_len,
        bytes_in = upstream.body.len(),
        status = %upstream.status,
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "Upstream replied"
    );

    Ok(response::passthrough(upstream))
}

fn with_cors(relay: &RelayState, headers: &HeaderMap, mut response: Response) -> Response {
    if let Some(origin) = relay.access.cors_origin(headers) {
        apply_cors(response.headers_mut(), origin);
    }
    response
}

fn reject(err: RelayError, request_id: &str) -> Response {
    match &err {
        RelayError::Upstream(source) => {
            tracing::error!(
                request_id = %request_id,
                kind = source.kind(),
                error = %source,
                "Upstream request failed"
            );
        }
        other => {
            tracing::warn!(request_id = %request_id, reason = other.reason(), "Request rejected");
        }
    }
    metrics::record_rejection(err.reason());
    err.into_response()
}
