//! Extraction of the `u` target parameter.
//!
//! The query string is form-decoded once. Callers that double-encode the
//! target end up with a value that still has no `://`; that value is
//! percent-decoded a second time. Raw and encoded forms of the same URL
//! therefore resolve to the same target.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;

pub const TARGET_PARAM: &str = "u";

/// Returns the decoded target, or `None` when missing or empty.
#[must_use]
pub fn extract_target(query: Option<&str>) -> Option<String> {
    let query = query?;
    let value = url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == TARGET_PARAM)
        .map(|(_, value)| value)?;

    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if looks_absolute(value) {
        return Some(value.to_string());
    }

    let decoded = percent_decode_str(value)
        .decode_utf8()
        .unwrap_or(Cow::Borrowed(value));
    Some(decoded.into_owned())
}

fn looks_absolute(value: &str) -> bool {
    value.contains("://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_and_raw_resolve_identically() {
        let encoded = extract_target(Some("u=https%3A%2F%2Fallowed.example%2Fpath"));
        let raw = extract_target(Some("u=https://allowed.example/path"));
        assert_eq!(encoded.as_deref(), Some("https://allowed.example/path"));
        assert_eq!(encoded, raw);
    }

    #[test]
    fn double_encoded_is_decoded_again() {
        let target = extract_target(Some("u=https%253A%252F%252Fallowed.example%252Fa.ts"));
        assert_eq!(target.as_deref(), Some("https://allowed.example/a.ts"));
    }

    #[test]
    fn encoded_query_in_target_survives() {
        let target = extract_target(Some(
            "u=https%3A%2F%2Fcdn.example%2Flive.m3u8%3Ftoken%3Dabc%26q%3D1",
        ));
        assert_eq!(
            target.as_deref(),
            Some("https://cdn.example/live.m3u8?token=abc&q=1")
        );
    }

    #[test]
    fn other_params_ignored() {
        let target = extract_target(Some("x=1&u=http%3A%2F%2Fa.example%2F&y=2"));
        assert_eq!(target.as_deref(), Some("http://a.example/"));
    }

    #[test]
    fn missing_or_empty_is_none() {
        assert_eq!(extract_target(None), None);
        assert_eq!(extract_target(Some("")), None);
        assert_eq!(extract_target(Some("v=https://a.example/")), None);
        assert_eq!(extract_target(Some("u=")), None);
        assert_eq!(extract_target(Some("u=%20%20")), None);
    }

    #[test]
    fn non_url_passes_through_for_later_rejection() {
        assert_eq!(extract_target(Some("u=not-a-url")).as_deref(), Some("not-a-url"));
    }
}
