//! Health check endpoint for liveness probes.

use axum::http::StatusCode;

/// Health handler.
///
/// Replies 200 as long as the process is up and accepting connections; it
/// deliberately does not probe the broker, so a flapping broker connection
/// does not get the relay restarted out from under its retry logic.
pub async fn health_handler() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}
