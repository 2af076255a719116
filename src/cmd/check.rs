//! `tv-bridge check` — evaluate a URL against the allow-list offline.
//!
//! Runs the same validation as the `/f` endpoint (decoding, URL parse,
//! scheme and allow-list checks) without touching the network.

use axum::http::HeaderMap;

use crate::cli::CheckArgs;
use crate::config::allow_list_from_args;
use crate::error::BridgeError;
use crate::proxy;

pub fn execute(args: &CheckArgs) -> Result<(), BridgeError> {
    let allow = allow_list_from_args(&args.allow)?;
    let query = format!(
        "{}={}",
        proxy::target::TARGET_PARAM,
        url::form_urlencoded::byte_serialize(args.url.as_bytes()).collect::<String>()
    );

    match proxy::validate(&allow, Some(&query), &HeaderMap::new()) {
        Ok(request) => {
            println!(
                "\u{2713} allowed ({} mode): {}",
                allow.mode(),
                request.target
            );
            Ok(())
        }
        Err(e) => Err(BridgeError::Rejected(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::AllowArgs;
    use crate::policy::DEFAULT_ALLOW_PATTERN;

    fn args(url: &str, hosts: &[&str]) -> CheckArgs {
        CheckArgs {
            url: url.into(),
            allow: AllowArgs {
                allow_hosts: hosts.iter().map(|h| (*h).to_string()).collect(),
                allow_pattern: DEFAULT_ALLOW_PATTERN.into(),
            },
        }
    }

    #[test]
    fn allowed_url_passes() {
        assert!(execute(&args("https://cdn.example.com/a.ts", &["example.com"])).is_ok());
    }

    #[test]
    fn encoded_url_passes() {
        assert!(execute(&args("https%3A%2F%2Fexample.com%2Fa.ts", &["example.com"])).is_ok());
    }

    #[test]
    fn foreign_url_rejected() {
        let err = execute(&args("https://evil.com/x", &["example.com"])).unwrap_err();
        assert!(matches!(err, BridgeError::Rejected(_)));
    }
}
