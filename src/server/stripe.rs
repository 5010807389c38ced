//! Stripe webhook endpoint.
//!
//! # Request
//!
//! - Method: POST `/stripe`
//! - Body: JSON Stripe event with `id` and `type`
//!
//! # Response
//!
//! - 200 OK: invoice event handled and published
//! - 204 No Content: recognized-but-unhandled event type, nothing published
//! - 400 Bad Request: body failed the schema
//! - 500 Internal Server Error: broker publish failed

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{debug, info};

use crate::webhooks::classify::classify_stripe;
use crate::webhooks::schema;
use crate::webhooks::StripeOutcome;

use super::error::HookError;
use super::AppState;

/// Stripe webhook handler: validate, classify by event type, publish.
pub async fn stripe_handler(
    State(app_state): State<AppState>,
    body: Bytes,
) -> Result<Response, HookError> {
    let payload = schema::stripe(&body)?;

    info!(
        stripe_event_id = %payload.id,
        event_type = %payload.event_type,
        "Handling Stripe webhook"
    );

    match classify_stripe(&payload) {
        StripeOutcome::Publish(event) => {
            app_state
                .publisher()
                .publish_event(event.name, &event.body)
                .await?;
            debug!(event = event.name, "Event enqueued");
            Ok((StatusCode::OK, "success").into_response())
        }
        StripeOutcome::Unhandled => {
            debug!(event_type = %payload.event_type, "Unhandled Stripe event type");
            Ok(StatusCode::NO_CONTENT.into_response())
        }
    }
}
