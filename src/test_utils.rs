//! Shared test utilities: publisher doubles for handler and worker tests.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::publish::{ensure_known_event, ensure_known_task, PublishError, Publisher};

/// Whether a recorded publish was an event or a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordedKind {
    Event,
    Task,
}

/// One publish accepted by a [`RecordingPublisher`].
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub kind: RecordedKind,
    pub name: String,
    pub body: Value,
}

/// A publisher double that records every accepted publish.
///
/// Registry enforcement matches the real gateway: unknown names are rejected
/// before recording, so a handler test cannot pass with a name the AMQP
/// publisher would refuse.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    records: Mutex<Vec<Recorded>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of everything published so far.
    pub fn recorded(&self) -> Vec<Recorded> {
        self.records.lock().unwrap().clone()
    }

    /// Returns just the published names, in publish order.
    pub fn names(&self) -> Vec<String> {
        self.recorded().into_iter().map(|r| r.name).collect()
    }

    fn record(&self, kind: RecordedKind, name: &str, body: &Value) {
        self.records.lock().unwrap().push(Recorded {
            kind,
            name: name.to_string(),
            body: body.clone(),
        });
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn publish_event(&self, name: &str, body: &Value) -> Result<(), PublishError> {
        ensure_known_event(name)?;
        self.record(RecordedKind::Event, name, body);
        Ok(())
    }

    async fn publish_task(&self, name: &str, body: &Value) -> Result<(), PublishError> {
        ensure_known_task(name)?;
        self.record(RecordedKind::Task, name, body);
        Ok(())
    }
}

/// A publisher double whose every publish fails with a broker error, for
/// exercising the 500/requeue paths.
#[derive(Debug, Default)]
pub struct FailingPublisher;

impl FailingPublisher {
    fn broker_down() -> PublishError {
        PublishError::broker(
            "publish failed",
            lapin::Error::InvalidConnectionState(lapin::ConnectionState::Closed),
        )
    }
}

#[async_trait]
impl Publisher for FailingPublisher {
    async fn publish_event(&self, name: &str, _body: &Value) -> Result<(), PublishError> {
        ensure_known_event(name)?;
        Err(Self::broker_down())
    }

    async fn publish_task(&self, name: &str, _body: &Value) -> Result<(), PublishError> {
        ensure_known_task(name)?;
        Err(Self::broker_down())
    }
}
