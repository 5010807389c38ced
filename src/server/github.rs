//! GitHub webhook endpoint.
//!
//! # Request
//!
//! - Method: POST `/github`
//! - Required headers: `x-github-event`, `x-github-delivery`
//! - Optional header: `user-agent` (must be GitHub-prefixed when present)
//! - Body: JSON webhook payload
//!
//! # Response
//!
//! - 201 Created: event type handled (zero or more events published)
//! - 200 OK with `pong`: ping event
//! - 202 Accepted: event type the relay has no handler for
//! - 400 Bad Request: header or body failed the schema
//! - 500 Internal Server Error: broker publish failed

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::webhooks::classify::classify_github;
use crate::webhooks::schema::{self, SchemaError};
use crate::webhooks::GithubOutcome;

use super::error::HookError;
use super::AppState;

/// GitHub webhook handler: validate headers, classify, publish.
pub async fn github_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, &'static str), HookError> {
    let parsed = schema::github_headers(&headers)?;
    let payload: Value = serde_json::from_slice(&body).map_err(SchemaError::Json)?;

    info!(
        event_type = %parsed.event_type,
        delivery_id = %parsed.delivery_id,
        "Handling GitHub webhook"
    );

    match classify_github(&parsed.event_type, &parsed.delivery_id, &payload) {
        GithubOutcome::Pong => {
            debug!(delivery_id = %parsed.delivery_id, "Responding to ping");
            Ok((StatusCode::OK, "pong"))
        }
        GithubOutcome::Publish(events) => {
            for event in &events {
                app_state
                    .publisher()
                    .publish_event(event.name, &event.body)
                    .await?;
                debug!(event = event.name, delivery_id = %parsed.delivery_id, "Event enqueued");
            }
            Ok((StatusCode::CREATED, "success"))
        }
        GithubOutcome::Ignored => {
            warn!(event_type = %parsed.event_type, "Ignoring event");
            Ok((StatusCode::ACCEPTED, "No handler for given event type"))
        }
    }
}
