//! HTTP boundary of the relay.
//!
//! One POST route per webhook source, each running the same pipeline:
//! validate → classify → publish → map the outcome to a status code. The
//! handlers own no broker state; they go through the [`Publisher`] injected
//! into [`AppState`] at startup.
//!
//! # Endpoints
//!
//! - `POST /github`, `POST /stripe`, `POST /datadog`, `POST /prometheus`,
//!   `POST /psad` - webhook ingestion
//! - `GET /health` - liveness probe
//! - `GET /version` - running build version

use std::sync::Arc;

use crate::publish::Publisher;

pub mod datadog;
pub mod error;
pub mod github;
pub mod health;
pub mod prometheus;
pub mod psad;
pub mod stripe;
pub mod version;

pub use datadog::datadog_handler;
pub use error::HookError;
pub use github::github_handler;
pub use health::health_handler;
pub use prometheus::prometheus_handler;
pub use psad::psad_handler;
pub use stripe::stripe_handler;
pub use version::version_handler;

/// Shared application state, passed to all handlers via Axum's `State`
/// extractor.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// The publisher gateway; the only path from handlers to the broker.
    publisher: Arc<dyn Publisher>,

    /// Expected value of the Datadog payload's `secret` field.
    datadog_secret: String,
}

impl AppState {
    /// Creates a new `AppState`.
    ///
    /// # Arguments
    ///
    /// * `publisher` - A connected publisher gateway
    /// * `datadog_secret` - Expected `secret` field for Datadog payloads
    pub fn new(publisher: Arc<dyn Publisher>, datadog_secret: impl Into<String>) -> Self {
        AppState {
            inner: Arc::new(AppStateInner {
                publisher,
                datadog_secret: datadog_secret.into(),
            }),
        }
    }

    /// Returns the publisher gateway.
    pub fn publisher(&self) -> &dyn Publisher {
        self.inner.publisher.as_ref()
    }

    /// Returns the expected Datadog secret.
    pub fn datadog_secret(&self) -> &str {
        &self.inner.datadog_secret
    }
}

/// Builds the axum Router with all endpoints.
pub fn build_router(app_state: AppState) -> axum::Router {
    use axum::routing::{get, post};

    axum::Router::new()
        .route("/github", post(github_handler))
        .route("/stripe", post(stripe_handler))
        .route("/datadog", post(datadog_handler))
        .route("/prometheus", post(prometheus_handler))
        .route("/psad", post(psad_handler))
        .route("/health", get(health_handler))
        .route("/version", get(version_handler))
        .with_state(app_state)
}
