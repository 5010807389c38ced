//! Publisher gateway: the sole authorized path to the broker.
//!
//! Handlers and workers never touch the broker client directly; they receive
//! a [`Publisher`] at construction time and hand it name/body pairs. The
//! gateway checks every name against the static registry before any I/O, so
//! a typo in an event name fails loudly instead of publishing to a queue
//! nobody consumes.
//!
//! The AMQP implementation lives in [`amqp`]; tests substitute a recording
//! double through the same trait.

pub mod amqp;

pub use amqp::AmqpPublisher;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::registry;

/// Errors from the publisher gateway.
///
/// The `Unknown*` variants are configuration errors in the relay itself and
/// are never worth retrying; `Broker` failures are connectivity problems
/// that a later redelivery may get past.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The event name is not declared in [`registry::EVENTS`].
    #[error("unknown event name {0:?}: not declared in the event registry")]
    UnknownEvent(String),

    /// The task name is not declared in [`registry::TASKS`].
    #[error("unknown task name {0:?}: not declared in the task registry")]
    UnknownTask(String),

    /// The message body could not be encoded as JSON.
    #[error("failed to encode message body: {0}")]
    Encode(#[from] serde_json::Error),

    /// The broker rejected the operation or is unreachable.
    #[error("broker {context}: {source}")]
    Broker {
        context: &'static str,
        #[source]
        source: lapin::Error,
    },
}

impl PublishError {
    pub(crate) fn broker(context: &'static str, source: lapin::Error) -> Self {
        PublishError::Broker { context, source }
    }

    /// Returns true if retrying the publish later could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PublishError::Broker { .. })
    }
}

/// The publish operations available to handlers and workers.
///
/// Both calls return once the broker has accepted the message for delivery
/// (publisher confirm), or surface the failure to the caller; neither
/// retries internally.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publishes a fan-out event under `name`.
    async fn publish_event(&self, name: &str, body: &Value) -> Result<(), PublishError>;

    /// Publishes an at-most-one-consumer task under `name`.
    async fn publish_task(&self, name: &str, body: &Value) -> Result<(), PublishError>;
}

/// Rejects event names missing from the static registry.
pub(crate) fn ensure_known_event(name: &str) -> Result<(), PublishError> {
    if registry::is_known_event(name) {
        Ok(())
    } else {
        Err(PublishError::UnknownEvent(name.to_string()))
    }
}

/// Rejects task names missing from the static registry.
pub(crate) fn ensure_known_task(name: &str) -> Result<(), PublishError> {
    if registry::is_known_task(name) {
        Ok(())
    } else {
        Err(PublishError::UnknownTask(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_checks_gate_unknown_names() {
        assert!(ensure_known_event("github.pushed").is_ok());
        assert!(matches!(
            ensure_known_event("github.push"),
            Err(PublishError::UnknownEvent(_))
        ));

        assert!(ensure_known_task("github.push").is_ok());
        assert!(matches!(
            ensure_known_task("github.pushed"),
            Err(PublishError::UnknownTask(_))
        ));
    }

    #[test]
    fn only_broker_failures_are_retryable() {
        assert!(!PublishError::UnknownEvent("x".to_string()).is_retryable());
        assert!(!PublishError::UnknownTask("x".to_string()).is_retryable());
    }
}
