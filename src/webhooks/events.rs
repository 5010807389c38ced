//! Classified events produced by the webhook pipeline.
//!
//! A [`ClassifiedEvent`] is the unit handed to the publisher gateway: a
//! dot-namespaced event name drawn from the static registry, plus the JSON
//! body that will be delivered to subscribers.
//!
//! # Body shapes
//!
//! | Source | Body |
//! |--------|------|
//! | github | `{ "deliveryId": <id>, "payload": <webhook payload> }` |
//! | stripe | `{ "stripeEventId": <id>, "stripeCustomerId": <id>? }` |
//! | datadog / psad | the validated payload, verbatim |
//! | prometheus | one alert element of the `alerts` array, verbatim |

use serde_json::Value;

/// A named event ready for publishing.
///
/// When one inbound request produces several events, their order follows the
/// classification rules' insertion order. That ordering carries no semantic
/// weight, but it is deterministic so tests can assert on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedEvent {
    /// Dot-namespaced event name (e.g., `github.pull-request.opened`).
    /// Always one of the names declared in [`crate::registry`].
    pub name: &'static str,
    /// The event body delivered to subscribers.
    pub body: Value,
}

impl ClassifiedEvent {
    pub fn new(name: &'static str, body: Value) -> Self {
        ClassifiedEvent { name, body }
    }
}
