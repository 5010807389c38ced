//! Handler for `datadog.hook.received` jobs.
//!
//! Datadog monitors smuggle structured data through the alert message text;
//! this handler extracts the sentinel-delimited record, derives the matching
//! `dock.*` event from its `type` entry, and republishes the full record as
//! the event body.

use serde_json::Value;
use tracing::info;

use crate::publish::{PublishError, Publisher};
use crate::webhooks::schema;

use super::{dock, embedded, JobError};

/// Processes one `datadog.hook.received` job.
///
/// # Errors
///
/// Permanent (must not requeue): invalid job payload, malformed embedded
/// record, or an alert type with no `dock.*` counterpart. Retryable: broker
/// publish failure.
pub async fn handle(job: &Value, publisher: &dyn Publisher) -> Result<(), JobError> {
    let parsed = schema::datadog_job(job)?;
    let record = embedded::parse(&parsed.event_msg)?;

    let alert_type = record.get("type").unwrap_or_default();
    let name = dock::dock_event_name(alert_type)
        .ok_or_else(|| JobError::UnhandledType(alert_type.to_string()))?;

    let body = serde_json::to_value(&record).map_err(PublishError::Encode)?;
    publisher.publish_event(name, &body).await?;

    info!(event = name, "Republished fleet-health event");
    Ok(())
}
