//! Upstream allow-list.
//!
//! [`AllowList`] decides whether a target may be contacted at all. Two
//! modes exist:
//!
//! - [`AllowList::Hosts`] parses the candidate as a URL and accepts it
//!   when its hostname equals a configured host or is a subdomain of one.
//!   Unparseable candidates are rejected.
//! - [`AllowList::Pattern`] matches a regex against the raw candidate
//!   string. The default pattern only checks the scheme, so this mode
//!   accepts any host. It is the less secure fallback and is only used
//!   when no host list is configured.
//!
//! Evaluation is pure: no I/O, no DNS.

use regex::Regex;
use url::Url;

use crate::error::BridgeError;

pub const DEFAULT_ALLOW_PATTERN: &str = "^https?://";

#[derive(Debug, Clone)]
pub enum AllowList {
    Hosts(Vec<String>),
    Pattern(Regex),
}

impl AllowList {
    /// Build a hostname allow-list. Entries are trimmed and lower-cased;
    /// blank entries are dropped. An empty result is an error.
    pub fn hosts<I, S>(hosts: I) -> Result<Self, BridgeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let hosts: Vec<String> = hosts
            .into_iter()
            .map(|h| h.as_ref().trim().to_ascii_lowercase())
            .filter(|h| !h.is_empty())
            .collect();

        if hosts.is_empty() {
            return Err(BridgeError::InvalidConfig {
                field: "allow-hosts",
                message: "host list is empty".into(),
            });
        }
        Ok(Self::Hosts(hosts))
    }

    pub fn pattern(pattern: &str) -> Result<Self, BridgeError> {
        Ok(Self::Pattern(Regex::new(pattern)?))
    }

    #[must_use]
    pub fn is_allowed(&self, candidate: &str) -> bool {
        match self {
            Self::Hosts(hosts) => {
                let Ok(url) = Url::parse(candidate) else {
                    return false;
                };
                let Some(host) = url.host_str() else {
                    return false;
                };
                let host = host.to_ascii_lowercase();
                hosts.iter().any(|allowed| host_matches(&host, allowed))
            }
            Self::Pattern(re) => re.is_match(candidate),
        }
    }

    #[must_use]
    pub const fn mode(&self) -> &'static str {
        match self {
            Self::Hosts(_) => "hosts",
            Self::Pattern(_) => "pattern",
        }
    }
}

fn host_matches(host: &str, allowed: &str) -> bool {
    host == allowed
        || host
            .strip_suffix(allowed)
            .is_some_and(|prefix| prefix.ends_with('.'))
}
