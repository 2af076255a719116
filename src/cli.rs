//! Command-line interface definitions using clap derive macros.
//!
//! Contains the top-level [`Cli`] parser, the [`Commands`] enum for
//! subcommands (run, check, health), and their associated argument
//! structs. Every server flag has an environment variable equivalent
//! for container deployments.

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::{DEFAULT_RETRIES, DEFAULT_TIMEOUT_MS};
use crate::policy::DEFAULT_ALLOW_PATTERN;

#[derive(Parser)]
#[command(
    name = "tv-bridge",
    version,
    about = "Allow-listed HTTP forwarding bridge",
    propagate_version = true,
    after_help = "\x1b[1mQuick start:\x1b[0m\n  \
        tv-bridge run --allow-hosts example.com        Serve GET /f?u=<url>\n  \
        tv-bridge check https://cdn.example.com/a.ts   Test a URL against the allow-list\n  \
        tv-bridge health http://localhost:8080         Probe a running instance"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the bridge server
    Run(Box<RunArgs>),

    /// Check whether a URL passes the allow-list
    Check(CheckArgs),

    /// Check health of a running instance
    Health(HealthArgs),
}

/// Allow-list selection shared by `run` and `check`.
#[derive(Args, Clone, Debug)]
pub struct AllowArgs {
    /// Comma-separated upstream hosts; subdomains are allowed too
    #[arg(
        long,
        env = "UPSTREAM_ALLOW_HOSTS",
        value_delimiter = ',',
        help_heading = "Allow-list"
    )]
    pub allow_hosts: Vec<String>,

    /// Regex matched against the full target URL, used when no host list is set
    #[arg(
        long,
        env = "UPSTREAM_ALLOW",
        default_value = DEFAULT_ALLOW_PATTERN,
        help_heading = "Allow-list"
    )]
    pub allow_pattern: String,
}

#[derive(Args)]
#[command(after_help = "\x1b[1mExamples:\x1b[0m\n  \
        tv-bridge run --allow-hosts example.com,cdn.example.net   Host allow-list\n  \
        tv-bridge run --allow-pattern '^https://cdn\\.'           Regex allow-list\n  \
        tv-bridge run -p 9000 --pretty                           Local dev mode")]
pub struct RunArgs {
    /// Listen port
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Listen address
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[command(flatten)]
    pub allow: AllowArgs,

    // -- Logging --
    /// Log level
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Force pretty (human-readable) log output
    #[arg(long)]
    pub pretty: bool,

    /// Force JSON log output (overrides TTY detection)
    #[arg(long, conflicts_with = "pretty")]
    pub json: bool,

    // -- Tuning --
    /// Per-attempt upstream timeout in milliseconds
    #[arg(
        long,
        env = "BRIDGE_TIMEOUT_MS",
        default_value_t = DEFAULT_TIMEOUT_MS,
        help_heading = "Tuning"
    )]
    pub timeout: u64,

    /// Extra attempts after a transport failure
    #[arg(
        long,
        env = "BRIDGE_RETRIES",
        default_value_t = DEFAULT_RETRIES,
        help_heading = "Tuning"
    )]
    pub retries: u32,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Target URL, raw or percent-encoded
    pub url: String,

    #[command(flatten)]
    pub allow: AllowArgs,
}

#[derive(Args)]
pub struct HealthArgs {
    /// URL of the running instance
    #[arg(default_value = "http://localhost:8080")]
    pub url: String,
}

#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}
