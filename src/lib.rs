//! tv-bridge is an allow-listed HTTP forwarding bridge.
//!
//! It serves `GET /f?u=<target>`: the target URL is checked against an
//! allow-list, a fixed set of request headers is projected onto an
//! upstream GET, transport failures are retried with linear backoff, and
//! the upstream response is streamed back with hop-by-hop headers removed
//! and `cache-control: no-store` forced.
//!
//! # Architecture
//!
//! - [`cli`] -- Command-line argument parsing with clap derive macros.
//! - [`cmd`] -- Subcommand dispatch and execution (run, check, health).
//! - [`config`] -- Immutable [`BridgeConfig`](config::BridgeConfig) built once at startup.
//! - [`error`] -- Process and pipeline error types using `thiserror`.
//! - [`health`] -- `GET /health` liveness handler.
//! - [`logging`] -- Structured tracing setup with JSON and pretty-print output.
//! - [`policy`] -- Upstream allow-list (hostname membership or regex).
//! - [`proxy`] -- The forwarding pipeline: target extraction, header
//!   projection, fetch with retry, and streaming relay.
//! - [`server`] -- Axum server setup, shared application state, HTTP client, and
//!   graceful shutdown.

// Binary crate — public functions are internal, not consumed by external users.
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod health;
pub mod logging;
pub mod policy;
pub mod proxy;
pub mod server;
