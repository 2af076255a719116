//! `tv-bridge health`: probe `GET /health` of a running bridge.
//!
//! Goes through the same pooled rustls client the bridge uses upstream, so
//! an `https://` instance behind a terminating proxy can be probed too. The
//! instance counts as healthy only when it answers 2xx with the exact
//! health body.

use std::time::Duration;

use axum::http::Uri;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};

use crate::cli::HealthArgs;
use crate::error::BridgeError;
use crate::health::HEALTH_BODY;
use crate::server;

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

pub async fn execute(args: HealthArgs) -> Result<(), BridgeError> {
    let uri = health_uri(&args.url)?;
    probe(uri).await?;
    println!("\u{2713} tv-bridge is healthy ({})", args.url);
    Ok(())
}

fn health_uri(base: &str) -> Result<Uri, BridgeError> {
    format!("{}/health", base.trim_end_matches('/'))
        .parse()
        .map_err(|e: axum::http::uri::InvalidUri| BridgeError::UriParse {
            source: Box::new(e),
        })
}

async fn probe(uri: Uri) -> Result<(), BridgeError> {
    let client = server::build_http_client(PROBE_TIMEOUT);
    let mut request = hyper::Request::new(Full::new(Bytes::new()));
    *request.uri_mut() = uri;

    let response = tokio::time::timeout(PROBE_TIMEOUT, client.request(request))
        .await
        .map_err(|_| BridgeError::HttpRequest {
            source: format!("no answer within {PROBE_TIMEOUT:?}").into(),
        })?
        .map_err(|e| BridgeError::HttpRequest {
            source: Box::new(e),
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(BridgeError::HealthCheckFailed(status));
    }

    let body = response
        .into_body()
        .collect()
        .await
        .map_err(|e| BridgeError::HttpRequest {
            source: Box::new(e),
        })?
        .to_bytes();
    if body.as_ref() != HEALTH_BODY.as_bytes() {
        return Err(BridgeError::UnexpectedHealthBody(
            String::from_utf8_lossy(&body).into_owned(),
        ));
    }
    Ok(())
}
