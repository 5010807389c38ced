//! Per-source payload validation.
//!
//! Each webhook source gets a typed payload shape, decoded once at the
//! boundary. Validation is permissive about unknown fields (they are
//! ignored, never rejected) and strict about the fields each source
//! contract names: required presence, type, enumerated values, and the
//! Datadog sentinel pattern.
//!
//! All failures surface as [`SchemaError`], which the HTTP boundary maps to
//! a 400 response. Validation is a pure function of its inputs: calling it
//! twice on the same payload yields the same result.

use std::net::IpAddr;

use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::types::DeliveryId;
use crate::worker::embedded::SENTINEL;

/// Header carrying the GitHub event type.
pub const HEADER_GITHUB_EVENT: &str = "x-github-event";
/// Header carrying the GitHub delivery ID.
pub const HEADER_GITHUB_DELIVERY: &str = "x-github-delivery";

/// A payload or header set that failed its source schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A required header is absent or empty.
    #[error("missing required header: {0}")]
    MissingHeader(&'static str),

    /// A header is present but has an unacceptable value.
    #[error("invalid header value for {header}: {reason}")]
    InvalidHeader {
        header: &'static str,
        reason: &'static str,
    },

    /// JSON deserialization failed (includes missing required fields and
    /// wrong field types).
    #[error("invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),

    /// A required field is absent or has the wrong type.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A field is present but fails a value constraint.
    #[error("invalid field value for {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// The payload's `secret` does not match the configured value.
    #[error("secret field does not match the configured secret")]
    SecretMismatch,
}

// ============================================================================
// github
// ============================================================================

/// Validated GitHub webhook headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubHeaders {
    /// The `x-github-event` value (e.g., "push", "pull_request").
    pub event_type: String,
    /// The unique delivery ID for this webhook.
    pub delivery_id: DeliveryId,
}

/// Validates the headers of a GitHub webhook request.
///
/// Requires non-empty `x-github-event` and `x-github-delivery` headers.
/// A `user-agent` header is optional, but when present it must carry the
/// `GitHub` prefix GitHub's hook sender uses.
pub fn github_headers(headers: &HeaderMap) -> Result<GithubHeaders, SchemaError> {
    let event_type = require_header(headers, HEADER_GITHUB_EVENT)?;
    let delivery_id = require_header(headers, HEADER_GITHUB_DELIVERY)?;

    if let Some(user_agent) = headers.get("user-agent") {
        let ok = user_agent
            .to_str()
            .map(|ua| ua.starts_with("GitHub"))
            .unwrap_or(false);
        if !ok {
            return Err(SchemaError::InvalidHeader {
                header: "user-agent",
                reason: "expected a GitHub-prefixed user agent",
            });
        }
    }

    Ok(GithubHeaders {
        event_type,
        delivery_id: DeliveryId::new(delivery_id),
    })
}

fn require_header(headers: &HeaderMap, name: &'static str) -> Result<String, SchemaError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or(SchemaError::MissingHeader(name))
}

// ============================================================================
// stripe
// ============================================================================

/// Validated Stripe event payload.
///
/// Only the identifying fields are decoded; the rest of the event object is
/// deliberately ignored (downstream workers re-fetch the event through the
/// Stripe API).
#[derive(Debug, Clone, Deserialize)]
pub struct StripePayload {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub data: Option<StripeEventData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeEventData {
    #[serde(default)]
    pub object: Option<StripeEventObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeEventObject {
    #[serde(default)]
    pub customer: Option<String>,
}

impl StripePayload {
    /// Returns the nested `data.object.customer` field, if present.
    pub fn customer_id(&self) -> Option<&str> {
        self.data
            .as_ref()
            .and_then(|d| d.object.as_ref())
            .and_then(|o| o.customer.as_deref())
    }
}

/// Validates a Stripe webhook body.
pub fn stripe(body: &[u8]) -> Result<StripePayload, SchemaError> {
    Ok(serde_json::from_slice(body)?)
}

// ============================================================================
// datadog
// ============================================================================

/// The `alert_transition` values Datadog sends for monitor state changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertTransition {
    #[serde(rename = "Triggered")]
    Triggered,
    #[serde(rename = "No data")]
    NoData,
    #[serde(rename = "Re-Triggered")]
    ReTriggered,
}

/// Validated Datadog webhook payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatadogPayload {
    pub id: String,
    pub event_title: String,
    pub event_msg: String,
    pub date: String,
    pub alert_transition: AlertTransition,
    pub secret: String,
}

/// Validates a Datadog webhook body.
///
/// Beyond field presence, the `event_msg` must contain a sentinel-delimited
/// data segment (two `[RUNNABLE_DATA]` markers with a `type=` entry between
/// them) and the `secret` field must equal the configured secret.
pub fn datadog(body: &[u8], expected_secret: &str) -> Result<DatadogPayload, SchemaError> {
    let payload: DatadogPayload = serde_json::from_slice(body)?;

    check_sentinel_segment(&payload.event_msg)?;

    if payload.secret != expected_secret {
        return Err(SchemaError::SecretMismatch);
    }

    Ok(payload)
}

/// Validated Datadog worker job: only the message text is required.
#[derive(Debug, Clone, Deserialize)]
pub struct DatadogJob {
    pub event_msg: String,
}

/// Validates a `datadog.hook.received` job payload.
pub fn datadog_job(job: &Value) -> Result<DatadogJob, SchemaError> {
    let parsed: DatadogJob = serde_json::from_value(job.clone())?;
    check_sentinel_segment(&parsed.event_msg)?;
    Ok(parsed)
}

/// Checks that `msg` matches the sentinel pattern: a `[RUNNABLE_DATA]`
/// marker, a `type=` entry, and a second marker, in that order.
fn check_sentinel_segment(msg: &str) -> Result<(), SchemaError> {
    let ok = msg
        .find(SENTINEL)
        .map(|start| &msg[start + SENTINEL.len()..])
        .and_then(|rest| rest.find("type=").map(|at| &rest[at..]))
        .map(|rest| rest.contains(SENTINEL))
        .unwrap_or(false);

    if ok {
        Ok(())
    } else {
        Err(SchemaError::InvalidField {
            field: "event_msg",
            reason: format!("expected a {SENTINEL}-delimited segment containing type="),
        })
    }
}

// ============================================================================
// prometheus
// ============================================================================

/// Validated Prometheus Alertmanager webhook payload.
///
/// Alert elements are kept as raw JSON: each element is republished verbatim
/// as its own event, so decoding them to a narrower shape here would lose
/// fields downstream consumers rely on.
#[derive(Debug, Clone)]
pub struct PrometheusHook {
    pub alerts: Vec<Value>,
}

/// Validates a Prometheus Alertmanager webhook body.
///
/// The body must carry an `alerts` array; every element must have `labels`
/// with a `type`, an IP-formatted `hostIp`, and a `githubOrgId`.
pub fn prometheus(body: &[u8]) -> Result<PrometheusHook, SchemaError> {
    let payload: Value = serde_json::from_slice(body)?;

    let alerts = payload
        .get("alerts")
        .and_then(Value::as_array)
        .ok_or(SchemaError::MissingField("alerts"))?;

    for alert in alerts {
        check_labels(alert.get("labels"))?;
    }

    Ok(PrometheusHook {
        alerts: alerts.clone(),
    })
}

/// Validated single-alert job, as consumed by the `prometheus.alert.received`
/// worker.
#[derive(Debug, Clone)]
pub struct PrometheusAlertJob {
    pub status: String,
    pub labels: Map<String, Value>,
    pub alert_type: String,
    pub host_ip: String,
}

/// Validates a `prometheus.alert.received` job payload (one alert with
/// top-level `status` and `labels`).
pub fn prometheus_alert_job(job: &Value) -> Result<PrometheusAlertJob, SchemaError> {
    let status = job
        .get("status")
        .and_then(Value::as_str)
        .ok_or(SchemaError::MissingField("status"))?
        .to_string();

    let labels = check_labels(job.get("labels"))?;

    Ok(PrometheusAlertJob {
        status,
        alert_type: labels.alert_type.to_string(),
        host_ip: labels.host_ip.to_string(),
        labels: labels.map.clone(),
    })
}

struct ValidLabels<'a> {
    map: &'a Map<String, Value>,
    alert_type: &'a str,
    host_ip: &'a str,
}

fn check_labels(value: Option<&Value>) -> Result<ValidLabels<'_>, SchemaError> {
    let map = value
        .and_then(Value::as_object)
        .ok_or(SchemaError::MissingField("labels"))?;

    let alert_type = map
        .get("type")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .ok_or(SchemaError::MissingField("labels.type"))?;

    let host_ip = map
        .get("hostIp")
        .and_then(Value::as_str)
        .ok_or(SchemaError::MissingField("labels.hostIp"))?;
    if host_ip.parse::<IpAddr>().is_err() {
        return Err(SchemaError::InvalidField {
            field: "labels.hostIp",
            reason: format!("not an IP address: {host_ip}"),
        });
    }

    if map.get("githubOrgId").and_then(Value::as_str).is_none() {
        return Err(SchemaError::MissingField("labels.githubOrgId"));
    }

    Ok(ValidLabels {
        map,
        alert_type,
        host_ip,
    })
}

// ============================================================================
// psad
// ============================================================================

/// Validated psad (port-scan attack detector) webhook payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PsadPayload {
    #[serde(rename = "containerId")]
    pub container_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs: Option<String>,
}

/// Validates a psad webhook body.
pub fn psad(body: &[u8]) -> Result<PsadPayload, SchemaError> {
    Ok(serde_json::from_slice(body)?)
}
