//! Error-to-response mapping shared by all webhook handlers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};

use crate::publish::PublishError;
use crate::webhooks::SchemaError;

/// Errors a webhook handler can surface to the HTTP layer.
///
/// The split matters for the response code: a schema violation is the
/// caller's fault (400), everything else is ours (500). The distinction is
/// carried by the variant, never by inspecting message text.
#[derive(Debug, Error)]
pub enum HookError {
    /// The request failed its source schema.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Publishing a classified event failed.
    #[error(transparent)]
    Publish(#[from] PublishError),
}

impl IntoResponse for HookError {
    fn into_response(self) -> Response {
        match &self {
            HookError::Schema(e) => {
                warn!(error = %e, "Invalid webhook request");
                (StatusCode::BAD_REQUEST, "Invalid Webhook Request").into_response()
            }
            HookError::Publish(e) => {
                error!(error = %e, "Failed to publish event");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}
