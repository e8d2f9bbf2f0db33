//! Outbound client for the fixed upstream.

use std::time::Duration;

use axum::body::Bytes;
use axum::http::{header, HeaderValue, StatusCode};
use reqwest::redirect::Policy;
use reqwest::Url;
use thiserror::Error;

use crate::config::UpstreamConfig;

/// Content type of every forwarded body. The upstream reads the raw text.
pub const FORWARD_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Failure to build the client or to complete one upstream call.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("invalid upstream url `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to build upstream client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("upstream request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    #[error("upstream connection failed: {0}")]
    Connect(#[source] reqwest::Error),

    #[error("upstream redirect rejected: {0}")]
    Redirect(#[source] reqwest::Error),

    #[error("upstream transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("failed to read upstream body: {0}")]
    Body(#[source] reqwest::Error),
}

impl UpstreamError {
    fn from_send(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout(err)
        } else if err.is_redirect() {
            UpstreamError::Redirect(err)
        } else if err.is_connect() {
            UpstreamError::Connect(err)
        } else {
            UpstreamError::Transport(err)
        }
    }

    fn from_body(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout(err)
        } else {
            UpstreamError::Body(err)
        }
    }

    /// Short label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamError::InvalidUrl { .. } => "invalid_url",
            UpstreamError::Build(_) => "build",
            UpstreamError::Timeout(_) => "timeout",
            UpstreamError::Connect(_) => "connect",
            UpstreamError::Redirect(_) => "redirect",
            UpstreamError::Transport(_) => "transport",
            UpstreamError::Body(_) => "body",
        }
    }
}

/// Upstream reply as relayed to the caller.
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

/// Pooled client bound to one upstream URL and its redirect/timeout policy.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    url: Url,
}

impl UpstreamClient {
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let url = Url::parse(&config.url).map_err(|source| UpstreamError::InvalidUrl {
            url: config.url.clone(),
            source,
        })?;

        let mut builder = reqwest::Client::builder()
            .redirect(redirect_policy(config))
            .https_only(config.https_only)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs));
        if !config.system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build().map_err(UpstreamError::Build)?;

        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// POST `body` verbatim and buffer the reply.
    ///
    /// The total timeout covers reading the reply body as well.
    pub async fn forward(&self, body: Bytes) -> Result<UpstreamResponse, UpstreamError> {
        let response = self
            .client
            .post(self.url.clone())
            .header(header::CONTENT_TYPE, FORWARD_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(UpstreamError::from_send)?;

        let status = response.status();
        let content_type = response.headers().get(header::CONTENT_TYPE).cloned();
        let body = response.bytes().await.map_err(UpstreamError::from_body)?;

        Ok(UpstreamResponse {
            status,
            content_type,
            body,
        })
    }
}

/// Why a redirect was not followed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RedirectRefusal {
    #[error("too many redirects (max {max})")]
    TooMany { max: usize },

    #[error("refusing non-https redirect to {target}")]
    Insecure { target: String },
}

/// Redirects are either refused outright, leaving the 3xx for the caller, or
/// followed a bounded number of times. Scripting platforms commonly answer
/// a POST with a 302 to a companion content domain.
fn redirect_policy(config: &UpstreamConfig) -> Policy {
    if !config.follow_redirects {
        return Policy::none();
    }

    let max = config.max_redirects;
    let https_only = config.https_only;
    Policy::custom(move |attempt| {
        // `previous` holds every URL requested so far, the original included.
        let hop = attempt.previous().len();
        match check_redirect(hop, attempt.url(), max, https_only) {
            Ok(()) => attempt.follow(),
            Err(refusal) => attempt.error(refusal),
        }
    })
}

/// Decide on redirect number `hop` (1-based) towards `target`.
fn check_redirect(
    hop: usize,
    target: &Url,
    max: usize,
    https_only: bool,
) -> Result<(), RedirectRefusal> {
    if hop > max {
        Err(RedirectRefusal::TooMany { max })
    } else if https_only && target.scheme() != "https" {
        Err(RedirectRefusal::Insecure {
            target: target.to_string(),
        })
    } else {
        Ok(())
    }
}
