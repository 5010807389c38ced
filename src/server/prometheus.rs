//! Prometheus Alertmanager webhook endpoint.
//!
//! # Request
//!
//! - Method: POST `/prometheus`
//! - Body: Alertmanager notification JSON with an `alerts` array
//!
//! # Response
//!
//! - 200 OK: every alert republished as its own
//!   `prometheus.alert.received` event
//! - 400 Bad Request: body failed the schema
//! - 500 Internal Server Error: broker publish failed

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use tracing::info;

use crate::webhooks::classify::classify_prometheus;
use crate::webhooks::schema;

use super::error::HookError;
use super::AppState;

/// Prometheus webhook handler: validate, fan out one event per alert.
pub async fn prometheus_handler(
    State(app_state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, &'static str), HookError> {
    let hook = schema::prometheus(&body)?;

    info!(alerts = hook.alerts.len(), "Handling Prometheus webhook");

    for event in classify_prometheus(&hook) {
        app_state
            .publisher()
            .publish_event(event.name, &event.body)
            .await?;
    }

    Ok((StatusCode::OK, "success"))
}
