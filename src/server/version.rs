//! Version endpoint for deployment verification.

use axum::http::StatusCode;

/// Version handler.
///
/// Returns the crate version so operators can confirm which build is
/// serving traffic.
pub async fn version_handler() -> (StatusCode, &'static str) {
    (StatusCode::OK, env!("CARGO_PKG_VERSION"))
}
