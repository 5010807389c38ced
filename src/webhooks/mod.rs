//! Webhook validation and classification.
//!
//! This module holds the decision half of the relay pipeline:
//!
//! - [`schema`] - per-source payload validation (typed shapes, decoded once)
//! - [`classify`] - event-name derivation from validated payloads
//! - [`events`] - the classified-event type handed to the publisher
//!
//! The HTTP and worker boundaries call into these in sequence; nothing here
//! performs I/O.

pub mod classify;
pub mod events;
pub mod schema;

pub use classify::{GithubOutcome, StripeOutcome};
pub use events::ClassifiedEvent;
pub use schema::SchemaError;
