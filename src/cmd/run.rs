//! `tv-bridge run` — start the bridge server.
//!
//! Builds the immutable [`BridgeConfig`] from flags and environment,
//! starts the Axum HTTP server, and shuts down gracefully on SIGTERM or
//! Ctrl+C.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::cli::RunArgs;
use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::logging;
use crate::server::{self, AppState};

pub async fn execute(args: RunArgs) -> Result<(), BridgeError> {
    let log_format = logging::resolve_format(args.pretty, args.json);
    logging::init(&args.log_level, log_format);

    let config = BridgeConfig::from_args(&args)?;
    let allow_mode = config.allow.mode();
    let timeout_ms = config.timeout.as_millis();
    let retries = config.retries;

    let state = Arc::new(AppState::new(config));
    let router = server::build_router(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        addr = %addr,
        allow_mode,
        timeout_ms = u64::try_from(timeout_ms).unwrap_or(u64::MAX),
        retries,
        "tv-bridge started"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(server::shutdown_signal())
        .await?;

    tracing::info!("tv-bridge stopped");
    Ok(())
}
