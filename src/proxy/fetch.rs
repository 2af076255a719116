//! Outbound fetch with per-attempt timeout and retry.
//!
//! [`UpstreamFetcher`] owns the shared pooled client. Every attempt
//! builds a fresh GET request from the [`ForwardRequest`] and is bounded
//! by `tokio::time::timeout`; when the timeout wins, the in-flight
//! request future is dropped before any backoff starts. Transport
//! failures are retried per [`RetryPolicy`]. Any HTTP response, whatever
//! its status, ends the loop.

use std::time::{Duration, Instant};

use axum::http::{HeaderMap, Uri};
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use url::Url;

use crate::error::{AttemptError, ForwardError, Rejection, UpstreamFetchError};
use crate::server::HttpClient;

use super::headers::ForwardedHeaders;
use super::retry::RetryPolicy;

pub type UpstreamResponse = hyper::Response<Incoming>;

/// A validated target plus the projected headers. Built once per
/// inbound request, never mutated.
#[derive(Debug, Clone)]
pub struct ForwardRequest {
    pub target: Url,
    uri: Uri,
    pub headers: ForwardedHeaders,
}

impl ForwardRequest {
    pub fn new(mut target: Url, inbound: &HeaderMap) -> Result<Self, ForwardError> {
        // fragments never go on the wire
        target.set_fragment(None);
        let uri = target
            .as_str()
            .parse::<Uri>()
            .map_err(|_| ForwardError::InvalidUpstream(Rejection::MalformedUri))?;
        Ok(Self {
            target,
            uri,
            headers: ForwardedHeaders::from_inbound(inbound),
        })
    }

    fn to_request(&self) -> hyper::Request<Full<Bytes>> {
        let mut request = hyper::Request::new(Full::new(Bytes::new()));
        *request.uri_mut() = self.uri.clone();
        *request.headers_mut() = self.headers.to_header_map();
        request
    }
}

#[derive(Clone)]
pub struct UpstreamFetcher {
    client: HttpClient,
    timeout: Duration,
    policy: RetryPolicy,
}

impl UpstreamFetcher {
    #[must_use]
    pub const fn new(client: HttpClient, timeout: Duration, policy: RetryPolicy) -> Self {
        Self {
            client,
            timeout,
            policy,
        }
    }

    /// Per-attempt timeout, also the idle bound between relayed body frames.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the upstream response and the attempt that produced it.
    pub async fn fetch(
        &self,
        req: &ForwardRequest,
        correlation_id: &str,
    ) -> Result<(UpstreamResponse, u32), UpstreamFetchError> {
        self.policy
            .run(move |attempt| self.attempt(req, attempt, correlation_id))
            .await
            .map_err(|exhausted| UpstreamFetchError {
                attempts: exhausted.attempts,
                source: exhausted.last_error,
            })
    }

    #[allow(clippy::cast_possible_truncation)]
    async fn attempt(
        &self,
        req: &ForwardRequest,
        attempt: u32,
        correlation_id: &str,
    ) -> Result<UpstreamResponse, AttemptError> {
        let start = Instant::now();
        let result =
            tokio::time::timeout(self.timeout, self.client.request(req.to_request())).await;
        let latency_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(Ok(response)) => {
                tracing::debug!(
                    correlation_id = %correlation_id,
                    attempt,
                    status = response.status().as_u16(),
                    latency_ms,
                    "upstream responded"
                );
                Ok(response)
            }
            Ok(Err(e)) => {
                tracing::debug!(
                    correlation_id = %correlation_id,
                    attempt,
                    latency_ms,
                    error = %e,
                    "upstream transport error"
                );
                Err(AttemptError::Transport(e))
            }
            Err(_) => Err(AttemptError::Timeout(self.timeout)),
        }
    }
}
