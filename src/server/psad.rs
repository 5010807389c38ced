//! psad (port-scan attack detector) webhook endpoint.
//!
//! # Request
//!
//! - Method: POST `/psad`
//! - Body: JSON with `containerId` (required) and `logs` (optional)
//!
//! # Response
//!
//! - 200 OK: payload republished under `psad.alert.received`
//! - 400 Bad Request: body failed the schema
//! - 500 Internal Server Error: broker publish failed

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use tracing::info;

use crate::webhooks::classify::classify_psad;
use crate::webhooks::schema;

use super::error::HookError;
use super::AppState;

/// psad webhook handler: validate, republish verbatim.
pub async fn psad_handler(
    State(app_state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, &'static str), HookError> {
    let payload = schema::psad(&body)?;

    info!(container_id = %payload.container_id, "Handling psad webhook");

    let event = classify_psad(&payload);
    app_state
        .publisher()
        .publish_event(event.name, &event.body)
        .await?;

    Ok((StatusCode::OK, "success"))
}
