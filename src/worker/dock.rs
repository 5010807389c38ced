//! Mapping from monitoring alert types to fleet-health event names.
//!
//! Both worker paths (the Datadog embedded blob and the Prometheus alert
//! labels) carry a `type` field naming a dock health condition; this module
//! owns the single mapping from those types to the `dock.*` events emitted
//! downstream.

use crate::registry;

/// Returns the `dock.*` event name for a monitoring alert type.
///
/// Returns `None` for unrecognized types; the caller must treat that as a
/// permanently unprocessable message, not a retryable failure.
pub fn dock_event_name(alert_type: &str) -> Option<&'static str> {
    match alert_type {
        "disk_filled" => Some(registry::DOCK_DISK_FILLED),
        "memory_exhausted" => Some(registry::DOCK_MEMORY_EXHAUSTED),
        "unresponsive" => Some(registry::DOCK_UNRESPONSIVE),
        _ => None,
    }
}
