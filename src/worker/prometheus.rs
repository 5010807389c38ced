//! Handler for `prometheus.alert.received` jobs.
//!
//! Alertmanager alerts arrive already structured, one per job. Resolved
//! alerts are dropped silently (a resolution is not an error and not a dock
//! event); firing alerts are mapped to a `dock.*` event by their `type`
//! label, and the labels object, augmented with a synthesized `host` URL, is
//! forwarded as the event body.

use serde_json::{json, Value};
use tracing::{debug, info};

use crate::publish::Publisher;
use crate::webhooks::schema;

use super::{dock, JobError};

/// Port the dock agent listens on; combined with the alert's `hostIp` label
/// to form the `host` field.
const DOCK_AGENT_PORT: u16 = 4242;

/// Processes one `prometheus.alert.received` job.
///
/// # Errors
///
/// Permanent (must not requeue): invalid job payload or an alert type with
/// no `dock.*` counterpart. Retryable: broker publish failure.
pub async fn handle(job: &Value, publisher: &dyn Publisher) -> Result<(), JobError> {
    let alert = schema::prometheus_alert_job(job)?;

    if alert.status != "firing" {
        debug!(status = %alert.status, "Dropping non-firing alert");
        return Ok(());
    }

    let name = dock::dock_event_name(&alert.alert_type)
        .ok_or_else(|| JobError::UnhandledType(alert.alert_type.clone()))?;

    let mut labels = alert.labels;
    labels.insert(
        "host".to_string(),
        json!(format!("http://{}:{}", alert.host_ip, DOCK_AGENT_PORT)),
    );

    publisher.publish_event(name, &Value::Object(labels)).await?;

    info!(event = name, "Republished fleet-health event");
    Ok(())
}
