//! Datadog webhook endpoint.
//!
//! # Request
//!
//! - Method: POST `/datadog`
//! - Body: JSON monitor notification; `event_msg` must carry the
//!   sentinel-delimited data segment and `secret` must match the configured
//!   value
//!
//! # Response
//!
//! - 200 OK: payload republished under `datadog.hook.received`
//! - 400 Bad Request: body failed the schema
//! - 500 Internal Server Error: broker publish failed

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use tracing::info;

use crate::webhooks::classify::classify_datadog;
use crate::webhooks::schema;

use super::error::HookError;
use super::AppState;

/// Datadog webhook handler: validate, republish verbatim.
pub async fn datadog_handler(
    State(app_state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, &'static str), HookError> {
    let payload = schema::datadog(&body, app_state.datadog_secret())?;

    info!(id = %payload.id, title = %payload.event_title, "Handling Datadog webhook");

    let event = classify_datadog(&payload);
    app_state
        .publisher()
        .publish_event(event.name, &event.body)
        .await?;

    Ok((StatusCode::OK, "success"))
}
