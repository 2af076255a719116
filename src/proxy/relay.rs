//! Streaming response relay.
//!
//! [`relay`] turns an upstream response into the client response: status,
//! every relayable header, then `cache-control: no-store`. The body is
//! wrapped in [`RelayBody`], which hands frames through one at a time so
//! memory stays bounded by the frame size whatever the payload length.
//!
//! `RelayBody` reports three terminal failures as [`RelayError`]:
//!
//! - the upstream body errors mid-stream. The error is returned as the
//!   body error, which makes hyper abort the client connection instead of
//!   ending the response as if it were complete.
//! - the upstream stops sending. While waiting on the next frame the body
//!   is bounded by an idle timeout; when it elapses the relay is aborted
//!   the same way.
//! - the client goes away. Hyper drops the body before it reached the
//!   end; the drop releases the upstream stream and is logged.
//!
//! None of these are retried.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use axum::body::Body;
use axum::http::header::CACHE_CONTROL;
use axum::http::HeaderValue;
use axum::response::Response;
use bytes::Bytes;
use http_body::{Body as HttpBody, Frame, SizeHint};
use tokio::time::Sleep;

use crate::error::{BoxError, RelayError};

use super::fetch::UpstreamResponse;
use super::headers::is_relayable;

#[must_use]
pub fn relay(upstream: UpstreamResponse, correlation_id: &str, idle: Duration) -> Response {
    let (parts, incoming) = upstream.into_parts();

    let mut response = Response::new(Body::new(RelayBody::new(
        incoming,
        correlation_id.to_string(),
        idle,
    )));
    *response.status_mut() = parts.status;

    let headers = response.headers_mut();
    for (name, value) in &parts.headers {
        if is_relayable(name) {
            // last value wins for repeated names
            headers.insert(name.clone(), value.clone());
        }
    }
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));

    response
}

/// Pass-through body that tracks progress and logs relay failures.
pub struct RelayBody<B> {
    inner: B,
    correlation_id: String,
    bytes: u64,
    finished: bool,
    idle: Duration,
    // armed when the upstream first returns Pending, cleared by the next frame
    stall: Option<Pin<Box<Sleep>>>,
}

impl<B> RelayBody<B> {
    pub const fn new(inner: B, correlation_id: String, idle: Duration) -> Self {
        Self {
            inner,
            correlation_id,
            bytes: 0,
            finished: false,
            idle,
            stall: None,
        }
    }

    fn complete(&mut self) {
        self.finished = true;
        tracing::debug!(
            correlation_id = %self.correlation_id,
            bytes = self.bytes,
            "relay complete"
        );
    }

    fn abort(&mut self, err: RelayError) -> RelayError {
        self.finished = true;
        tracing::error!(
            correlation_id = %self.correlation_id,
            error = %err,
            "relay aborted"
        );
        err
    }
}

impl<B> HttpBody for RelayBody<B>
where
    B: HttpBody<Data = Bytes> + Unpin,
    B::Error: Into<BoxError>,
{
    type Data = Bytes;
    type Error = RelayError;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        if this.finished {
            return Poll::Ready(None);
        }

        match Pin::new(&mut this.inner).poll_frame(cx) {
            Poll::Pending => {
                let idle = this.idle;
                let stall = this
                    .stall
                    .get_or_insert_with(|| Box::pin(tokio::time::sleep(idle)));
                if stall.as_mut().poll(cx).is_pending() {
                    return Poll::Pending;
                }
                let err = RelayError::Stalled {
                    bytes: this.bytes,
                    idle,
                };
                Poll::Ready(Some(Err(this.abort(err))))
            }
            Poll::Ready(Some(Ok(frame))) => {
                this.stall = None;
                if let Some(data) = frame.data_ref() {
                    this.bytes += data.len() as u64;
                }
                // hyper stops polling once a sized body reports its end
                if this.inner.is_end_stream() {
                    this.complete();
                }
                Poll::Ready(Some(Ok(frame)))
            }
            Poll::Ready(Some(Err(e))) => {
                let err = RelayError::Upstream {
                    bytes: this.bytes,
                    source: e.into(),
                };
                Poll::Ready(Some(Err(this.abort(err))))
            }
            Poll::Ready(None) => {
                this.complete();
                Poll::Ready(None)
            }
        }
    }

    fn is_end_stream(&self) -> bool {
        self.finished || self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

impl<B> Drop for RelayBody<B> {
    fn drop(&mut self) {
        if !self.finished && self.bytes > 0 {
            let err = RelayError::ClientDisconnected { bytes: self.bytes };
            tracing::warn!(
                correlation_id = %self.correlation_id,
                error = %err,
                "relay stopped early, releasing upstream body"
            );
        }
    }
}
