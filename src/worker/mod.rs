//! Queue worker for secondary event transformation.
//!
//! The worker process subscribes to a subset of the events the HTTP relay
//! republishes and emits derived fleet-health events:
//!
//! - `datadog.hook.received` → [`embedded`] blob extraction → `dock.*`
//! - `prometheus.alert.received` → firing filter + host synthesis → `dock.*`
//!
//! # Module Structure
//!
//! - [`embedded`]: sentinel-delimited blob parser
//! - [`dock`]: alert-type → `dock.*` event-name mapping
//! - [`datadog`], [`prometheus`]: per-queue job handlers
//! - [`server`]: the broker consumer loop (prefetch, ack/nack, shutdown)
//!
//! # Error Contract
//!
//! Handlers return [`JobError`]; the consumer loop inspects
//! [`JobError::is_retryable`] to decide between requeueing (broker
//! failures) and discarding to the dead-letter path (schema violations,
//! malformed blobs, unknown alert types). A permanently unprocessable
//! message must never be redelivered.

pub mod datadog;
pub mod dock;
pub mod embedded;
pub mod prometheus;
pub mod server;

use thiserror::Error;

use crate::publish::PublishError;
use crate::webhooks::schema::SchemaError;

use self::embedded::EmbeddedError;

/// Errors from processing one queued job.
#[derive(Debug, Error)]
pub enum JobError {
    /// The job payload failed its schema. Permanent.
    #[error("invalid job payload: {0}")]
    Schema(#[from] SchemaError),

    /// The embedded data segment could not be parsed. Permanent.
    #[error("embedded data segment: {0}")]
    Embedded(#[from] EmbeddedError),

    /// The alert names an event type with no downstream mapping. Permanent.
    #[error("unhandled alert type: {0:?}")]
    UnhandledType(String),

    /// Publishing the derived event failed.
    #[error(transparent)]
    Publish(#[from] PublishError),
}

impl JobError {
    /// Returns true if redelivering the message later could succeed.
    ///
    /// Only broker connectivity failures qualify; everything else is a
    /// property of the message itself and would fail identically on every
    /// redelivery.
    pub fn is_retryable(&self) -> bool {
        matches!(self, JobError::Publish(e) if e.is_retryable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_and_type_errors_are_permanent() {
        assert!(!JobError::UnhandledType("x".to_string()).is_retryable());
        assert!(!JobError::Embedded(EmbeddedError::MissingSegment).is_retryable());
    }

    #[test]
    fn unknown_name_publish_errors_are_permanent() {
        let err = JobError::Publish(PublishError::UnknownEvent("typo.event".to_string()));
        assert!(!err.is_retryable());
    }
}
