//! `GET /health` endpoint handler.
//!
//! Liveness only: always `200 text/plain "ok"`, no upstream checks.

pub const HEALTH_BODY: &str = "ok";

pub async fn health_handler() -> &'static str {
    HEALTH_BODY
}
