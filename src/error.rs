//! Unified error types for tv-bridge.
//!
//! [`BridgeError`] covers process-level failures (configuration, binding,
//! the `health` subcommand). The request pipeline has its own taxonomy:
//! [`ForwardError`] is what the entry handler maps to a client response,
//! [`UpstreamFetchError`] is the fetcher giving up after its retries, and
//! [`RelayError`] is a failure while streaming a body that has already
//! started. All derive `thiserror`.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BridgeError {
    #[error("Invalid configuration: {field} — {message}")]
    InvalidConfig {
        field: &'static str,
        message: String,
    },

    #[error("Invalid allow-list pattern: {0}")]
    AllowPattern(#[from] regex::Error),

    #[error("Invalid address: {0}")]
    AddressParse(#[from] std::net::AddrParseError),

    #[error("Invalid URI: {source}")]
    UriParse {
        #[source]
        source: BoxError,
    },

    #[error("HTTP request failed: {source}")]
    HttpRequest {
        #[source]
        source: BoxError,
    },

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Health check failed with status {0}")]
    HealthCheckFailed(hyper::StatusCode),

    #[error("Health check returned unexpected body: {0:?}")]
    UnexpectedHealthBody(String),

    #[error("Upstream rejected by allow-list: {0}")]
    Rejected(String),
}

/// A single failed attempt against the upstream.
#[derive(Debug, thiserror::Error)]
pub enum AttemptError {
    #[error("attempt timed out after {0:?}")]
    Timeout(Duration),

    #[error("transport error: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),
}

/// Every attempt failed; carries the last cause.
#[derive(Debug, thiserror::Error)]
#[error("upstream fetch failed after {attempts} attempt(s): {source}")]
pub struct UpstreamFetchError {
    pub attempts: u32,
    #[source]
    pub source: AttemptError,
}

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("upstream body failed after {bytes} bytes: {source}")]
    Upstream {
        bytes: u64,
        #[source]
        source: BoxError,
    },

    #[error("upstream body stalled for {idle:?} after {bytes} bytes")]
    Stalled { bytes: u64, idle: Duration },

    #[error("client went away after {bytes} bytes")]
    ClientDisconnected { bytes: u64 },
}

/// Why the target parameter was refused before any network activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Missing,
    NotAllowed,
    UnsupportedScheme,
    MalformedUri,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing => f.write_str("target parameter missing"),
            Self::NotAllowed => f.write_str("target not in allow-list"),
            Self::UnsupportedScheme => f.write_str("target scheme is not http or https"),
            Self::MalformedUri => f.write_str("target is not a valid request URI"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    #[error("invalid upstream: {0}")]
    InvalidUpstream(Rejection),

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error(transparent)]
    UpstreamFetch(#[from] UpstreamFetchError),
}

/// Fixed client-visible error payload. Never carries internal detail.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ForwardError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidUpstream(_) | Self::InvalidUrl(_) => StatusCode::BAD_REQUEST,
            Self::UpstreamFetch(_) => StatusCode::BAD_GATEWAY,
        }
    }

    #[must_use]
    pub const fn public_message(&self) -> &'static str {
        match self {
            Self::InvalidUpstream(Rejection::UnsupportedScheme | Rejection::MalformedUri)
            | Self::InvalidUrl(_) => "invalid url",
            Self::InvalidUpstream(_) => "invalid upstream",
            Self::UpstreamFetch(_) => "bridge fetch failed",
        }
    }
}

impl IntoResponse for ForwardError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.public_message().to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
