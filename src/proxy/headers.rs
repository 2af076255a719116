//! Header projection and hop-by-hop filtering.
//!
//! [`ForwardedHeaders::from_inbound`] keeps only the fixed set of request
//! headers the bridge passes upstream. [`is_relayable`] decides which
//! upstream response headers may be copied back to the client.

use std::sync::LazyLock;

use axum::http::header::{ACCEPT, RANGE, REFERER, USER_AGENT};
use axum::http::{HeaderMap, HeaderName, HeaderValue};

static HOP_BY_HOP: LazyLock<Vec<HeaderName>> = LazyLock::new(|| {
    ["transfer-encoding", "connection", "keep-alive"]
        .iter()
        .filter_map(|name| name.parse::<HeaderName>().ok())
        .collect()
});

/// The only inbound headers that travel upstream. Everything else
/// (cookies, authorization, host, custom headers) stays behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForwardedHeaders {
    pub referer: Option<HeaderValue>,
    pub user_agent: Option<HeaderValue>,
    pub range: Option<HeaderValue>,
    pub accept: Option<HeaderValue>,
}

impl ForwardedHeaders {
    #[must_use]
    pub fn from_inbound(inbound: &HeaderMap) -> Self {
        Self {
            referer: inbound.get(REFERER).cloned(),
            user_agent: inbound.get(USER_AGENT).cloned(),
            range: inbound.get(RANGE).cloned(),
            accept: inbound.get(ACCEPT).cloned(),
        }
    }

    #[must_use]
    pub fn to_header_map(&self) -> HeaderMap {
        let mut headers = HeaderMap::with_capacity(4);
        let pairs = [
            (REFERER, &self.referer),
            (USER_AGENT, &self.user_agent),
            (RANGE, &self.range),
            (ACCEPT, &self.accept),
        ];
        for (name, value) in pairs {
            if let Some(value) = value {
                headers.insert(name, value.clone());
            }
        }
        headers
    }
}

/// Whether an upstream response header may be copied to the client.
#[must_use]
pub fn is_relayable(name: &HeaderName) -> bool {
    // HeaderName is always lower-case
    !HOP_BY_HOP.contains(name) && !name.as_str().starts_with("proxy-")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inbound() -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert("referer", "https://x".parse().unwrap());
        h.insert("user-agent", "UA1".parse().unwrap());
        h.insert("range", "bytes=0-10".parse().unwrap());
        h.insert("x-custom", "z".parse().unwrap());
        h.insert("cookie", "session=abc".parse().unwrap());
        h.insert("authorization", "Bearer t".parse().unwrap());
        h.insert("host", "bridge.local".parse().unwrap());
        h
    }

    #[test]
    fn forwards_only_whitelisted_headers() {
        let out = ForwardedHeaders::from_inbound(&inbound()).to_header_map();

        assert_eq!(out.len(), 3);
        assert_eq!(out.get("referer").unwrap(), "https://x");
        assert_eq!(out.get("user-agent").unwrap(), "UA1");
        assert_eq!(out.get("range").unwrap(), "bytes=0-10");
        assert!(out.get("x-custom").is_none());
        assert!(out.get("cookie").is_none());
        assert!(out.get("authorization").is_none());
        assert!(out.get("host").is_none());
    }

    #[test]
    fn absent_headers_are_not_defaulted() {
        let projected = ForwardedHeaders::from_inbound(&HeaderMap::new());
        assert_eq!(projected, ForwardedHeaders::default());
        assert!(projected.to_header_map().is_empty());
    }

    #[test]
    fn accept_is_forwarded_verbatim() {
        let mut h = HeaderMap::new();
        h.insert("accept", "video/mp2t, */*;q=0.8".parse().unwrap());
        let out = ForwardedHeaders::from_inbound(&h).to_header_map();
        assert_eq!(out.get("accept").unwrap(), "video/mp2t, */*;q=0.8");
    }

    #[test]
    fn hop_by_hop_and_proxy_headers_not_relayable() {
        for name in [
            "transfer-encoding",
            "connection",
            "keep-alive",
            "proxy-authenticate",
            "proxy-connection",
            "Proxy-Foo",
        ] {
            let name: HeaderName = name.parse().unwrap();
            assert!(!is_relayable(&name), "{name} should be dropped");
        }
    }

    #[test]
    fn ordinary_headers_relayable() {
        for name in ["content-type", "content-length", "content-range", "etag", "x-proxy-id"] {
            let name: HeaderName = name.parse().unwrap();
            assert!(is_relayable(&name), "{name} should be kept");
        }
    }
}
