//! Immutable bridge configuration.
//!
//! [`BridgeConfig`] is assembled once from the CLI / environment at
//! startup and handed to [`AppState::new`](crate::server::AppState::new).
//! Nothing in the request path reads the environment.

use std::time::Duration;

use crate::cli::{AllowArgs, RunArgs};
use crate::error::BridgeError;
use crate::policy::AllowList;

pub const DEFAULT_TIMEOUT_MS: u64 = 25_000;
pub const DEFAULT_RETRIES: u32 = 2;

#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub allow: AllowList,
    /// Bound on each individual upstream attempt.
    pub timeout: Duration,
    /// Additional attempts after the first transport failure.
    pub retries: u32,
}

impl BridgeConfig {
    pub fn from_args(args: &RunArgs) -> Result<Self, BridgeError> {
        if args.timeout == 0 {
            return Err(BridgeError::InvalidConfig {
                field: "timeout",
                message: "must be greater than 0 ms".into(),
            });
        }

        Ok(Self {
            allow: allow_list_from_args(&args.allow)?,
            timeout: Duration::from_millis(args.timeout),
            retries: args.retries,
        })
    }
}

/// A configured host list selects hostname mode; otherwise the regex is used.
pub fn allow_list_from_args(args: &AllowArgs) -> Result<AllowList, BridgeError> {
    if args.allow_hosts.is_empty() {
        tracing::warn!(
            pattern = %args.allow_pattern,
            "no host list configured, using regex allow-list (accepts any matching host)"
        );
        AllowList::pattern(&args.allow_pattern)
    } else {
        AllowList::hosts(&args.allow_hosts)
    }
}
