//! Static registry of every event and task name this relay may publish.
//!
//! The publisher gateway refuses any name that is not declared here. A name
//! missing from the registry is a configuration error in the relay itself,
//! not a runtime data error: it means a handler was changed without updating
//! the registry, and the mistake should surface immediately rather than as a
//! silently unrouted message in production.

/// Source-control host events.
pub const GITHUB_PUSHED: &str = "github.pushed";
pub const GITHUB_BRANCH_CREATED: &str = "github.branch.created";
pub const GITHUB_BRANCH_DELETED: &str = "github.branch.deleted";
pub const GITHUB_TAG_CREATED: &str = "github.tag.created";
pub const GITHUB_TAG_DELETED: &str = "github.tag.deleted";
pub const GITHUB_REPOSITORY_CREATED: &str = "github.repository.created";

/// Payment processor events.
pub const STRIPE_INVOICE_CREATED: &str = "stripe.invoice.created";
pub const STRIPE_INVOICE_PAYMENT_SUCCEEDED: &str = "stripe.invoice.payment-succeeded";
pub const STRIPE_INVOICE_PAYMENT_FAILED: &str = "stripe.invoice.payment-failed";

/// Monitoring and intrusion-detection events, republished near-verbatim.
pub const DATADOG_HOOK_RECEIVED: &str = "datadog.hook.received";
pub const PROMETHEUS_ALERT_RECEIVED: &str = "prometheus.alert.received";
pub const PSAD_ALERT_RECEIVED: &str = "psad.alert.received";

/// Fleet-health events emitted by the workers.
pub const DOCK_DISK_FILLED: &str = "dock.disk.filled";
pub const DOCK_MEMORY_EXHAUSTED: &str = "dock.memory.exhausted";
pub const DOCK_UNRESPONSIVE: &str = "dock.unresponsive";

/// Tasks (at-most-one-consumer work assignments).
pub const GITHUB_PUSH_TASK: &str = "github.push";

/// Every event name the relay is allowed to publish.
///
/// The `github.pull-request.*` family is derived from the webhook's `action`
/// field (first underscore hyphenated, `synchronize` mapped to
/// `synchronized`); the full derived set is enumerated here so a typo in the
/// derivation logic is caught by the gateway.
pub const EVENTS: &[&str] = &[
    GITHUB_PUSHED,
    GITHUB_BRANCH_CREATED,
    GITHUB_BRANCH_DELETED,
    GITHUB_TAG_CREATED,
    GITHUB_TAG_DELETED,
    GITHUB_REPOSITORY_CREATED,
    "github.pull-request.assigned",
    "github.pull-request.unassigned",
    "github.pull-request.review-requested",
    "github.pull-request.review-request_removed",
    "github.pull-request.labeled",
    "github.pull-request.unlabeled",
    "github.pull-request.opened",
    "github.pull-request.edited",
    "github.pull-request.closed",
    "github.pull-request.reopened",
    "github.pull-request.synchronized",
    STRIPE_INVOICE_CREATED,
    STRIPE_INVOICE_PAYMENT_SUCCEEDED,
    STRIPE_INVOICE_PAYMENT_FAILED,
    DATADOG_HOOK_RECEIVED,
    PROMETHEUS_ALERT_RECEIVED,
    PSAD_ALERT_RECEIVED,
    DOCK_DISK_FILLED,
    DOCK_MEMORY_EXHAUSTED,
    DOCK_UNRESPONSIVE,
];

/// Every task name the relay is allowed to publish.
pub const TASKS: &[&str] = &[GITHUB_PUSH_TASK];

/// Returns true if `name` is a declared event name.
pub fn is_known_event(name: &str) -> bool {
    EVENTS.contains(&name)
}

/// Returns true if `name` is a declared task name.
pub fn is_known_task(name: &str) -> bool {
    TASKS.contains(&name)
}
