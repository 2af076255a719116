//! Core HTTP forwarding pipeline.
//!
//! [`forward_handler`] serves `GET /f?u=<target>`. It extracts the target
//! ([`target`]), checks it against the allow-list, projects the inbound
//! headers ([`headers`]), fetches with retry ([`fetch`], [`retry`]) and
//! streams the result back ([`relay`]). Validation failures return before
//! any network activity.

pub mod fetch;
pub mod headers;
pub mod relay;
pub mod retry;
pub mod target;

use std::sync::Arc;

use axum::extract::{RawQuery, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use url::Url;

use crate::error::{ForwardError, Rejection};
use crate::policy::AllowList;
use crate::server::AppState;

use fetch::ForwardRequest;

pub const CORRELATION_HEADER: &str = "x-correlation-id";
const MAX_CORRELATION_LEN: usize = 64;

pub async fn forward_handler(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
    req_headers: HeaderMap,
) -> Response {
    let correlation_id = correlation_id(&req_headers);

    let request = match validate(&state.allow, query.as_deref(), &req_headers) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(
                correlation_id = %correlation_id,
                error = %e,
                "rejected target"
            );
            return e.into_response();
        }
    };

    tracing::info!(
        correlation_id = %correlation_id,
        target = %request.target,
        "request received"
    );

    match state.fetcher.fetch(&request, &correlation_id).await {
        Ok((upstream, attempts)) => {
            tracing::info!(
                correlation_id = %correlation_id,
                target = %request.target,
                status = upstream.status().as_u16(),
                attempts,
                "relaying upstream response"
            );
            relay::relay(upstream, &correlation_id, state.fetcher.timeout())
        }
        Err(e) => {
            tracing::error!(
                correlation_id = %correlation_id,
                target = %request.target,
                error = %e,
                "bridge fetch failed"
            );
            ForwardError::from(e).into_response()
        }
    }
}

/// The inbound correlation id when it is a short plain token, otherwise a
/// fresh UUID v4.
fn correlation_id(headers: &HeaderMap) -> String {
    headers
        .get(CORRELATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|id| {
            !id.is_empty()
                && id.len() <= MAX_CORRELATION_LEN
                && id
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
        })
        .map_or_else(|| uuid::Uuid::new_v4().to_string(), String::from)
}

/// Everything that must succeed before a network call is allowed.
pub fn validate(
    allow: &AllowList,
    query: Option<&str>,
    inbound: &HeaderMap,
) -> Result<ForwardRequest, ForwardError> {
    let raw = target::extract_target(query)
        .ok_or(ForwardError::InvalidUpstream(Rejection::Missing))?;

    let url = Url::parse(&raw)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ForwardError::InvalidUpstream(Rejection::UnsupportedScheme));
    }
    if !allow.is_allowed(&raw) {
        return Err(ForwardError::InvalidUpstream(Rejection::NotAllowed));
    }

    ForwardRequest::new(url, inbound)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hosts() -> AllowList {
        AllowList::hosts(["example.com"]).unwrap()
    }

    #[test]
    fn allowed_subdomain_validates() {
        let req = validate(
            &hosts(),
            Some("u=https%3A%2F%2Fsub.example.com%2Fvideo.ts"),
            &HeaderMap::new(),
        )
        .unwrap();
        assert_eq!(req.target.as_str(), "https://sub.example.com/video.ts");
    }

    #[test]
    fn foreign_host_rejected() {
        let err = validate(&hosts(), Some("u=https://evil.com/x"), &HeaderMap::new()).unwrap_err();
        assert!(matches!(
            err,
            ForwardError::InvalidUpstream(Rejection::NotAllowed)
        ));
    }

    #[test]
    fn missing_target_rejected() {
        let err = validate(&hosts(), None, &HeaderMap::new()).unwrap_err();
        assert!(matches!(err, ForwardError::InvalidUpstream(Rejection::Missing)));
    }

    #[test]
    fn unparseable_target_is_invalid_url() {
        let err = validate(&hosts(), Some("u=not%20a%20url"), &HeaderMap::new()).unwrap_err();
        assert!(matches!(err, ForwardError::InvalidUrl(_)));
    }

    #[test]
    fn non_http_scheme_rejected_even_by_permissive_pattern() {
        let permissive = AllowList::pattern(".*").unwrap();
        let err = validate(
            &permissive,
            Some("u=file:///etc/passwd"),
            &HeaderMap::new(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ForwardError::InvalidUpstream(Rejection::UnsupportedScheme)
        ));
    }

    #[test]
    fn fragment_is_not_sent() {
        let req = validate(
            &hosts(),
            Some("u=https%3A%2F%2Fexample.com%2Fa.m3u8%23frag"),
            &HeaderMap::new(),
        )
        .unwrap();
        assert_eq!(req.target.as_str(), "https://example.com/a.m3u8");
    }

    #[test]
    fn plain_correlation_id_is_kept() {
        let mut headers = HeaderMap::new();
        headers.insert(CORRELATION_HEADER, "req-42_a.b".parse().unwrap());
        assert_eq!(correlation_id(&headers), "req-42_a.b");
    }

    #[test]
    fn unusable_correlation_id_is_replaced() {
        let mut headers = HeaderMap::new();
        headers.insert(CORRELATION_HEADER, "a b=c\"d".parse().unwrap());
        let replaced = correlation_id(&headers);
        assert!(uuid::Uuid::parse_str(&replaced).is_ok());

        headers.insert(CORRELATION_HEADER, "x".repeat(65).parse().unwrap());
        assert_eq!(correlation_id(&headers).len(), 36);

        headers.insert(CORRELATION_HEADER, "x".repeat(64).parse().unwrap());
        assert_eq!(correlation_id(&headers), "x".repeat(64));

        assert!(uuid::Uuid::parse_str(&correlation_id(&HeaderMap::new())).is_ok());
    }
}
