//! Event-name derivation for validated webhook payloads.
//!
//! This is where the relay's actual decision logic lives. Each source gets a
//! classifier that maps a validated payload (plus request metadata) to zero
//! or more [`ClassifiedEvent`]s. The classifiers never perform I/O; the
//! boundary decides what to do with the outcome.
//!
//! # GitHub rules
//!
//! | `x-github-event` | payload condition | event name |
//! |------------------|-------------------|------------|
//! | `ping` | — | none (reply `pong`, no publish) |
//! | `push` | — | `github.pushed` |
//! | `create` | `ref_type == branch` | `github.branch.created` |
//! | `create` | `ref_type == tag` | `github.tag.created` |
//! | `create` | `ref_type == repository` | `github.repository.created` |
//! | `delete` | `ref_type == branch` | `github.branch.deleted` |
//! | `delete` | `ref_type == tag` | `github.tag.deleted` |
//! | `pull_request` | recognized `action` | `github.pull-request.<action>` |
//! | anything else | — | none (ignored, not an error) |
//!
//! A recognized event type with an unmatched condition publishes nothing but
//! still counts as handled; only unknown event types are reported as ignored.

use serde_json::{json, Value};

use crate::registry;
use crate::types::DeliveryId;

use super::events::ClassifiedEvent;
use super::schema::{DatadogPayload, PrometheusHook, PsadPayload, StripePayload};

/// How a GitHub webhook should be answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GithubOutcome {
    /// A `ping` event: reply `pong`, publish nothing.
    Pong,
    /// A recognized event type. The vector may be empty (e.g., a `create`
    /// with an unrecognized `ref_type`), which is still a handled request.
    Publish(Vec<ClassifiedEvent>),
    /// An event type the relay has no handler for.
    Ignored,
}

/// Pull-request actions the relay republishes, with their derived event
/// names. `synchronize` maps to the past-tense `synchronized`; the others
/// keep GitHub's action name with the first underscore hyphenated.
const PULL_REQUEST_EVENTS: &[(&str, &str)] = &[
    ("assigned", "github.pull-request.assigned"),
    ("unassigned", "github.pull-request.unassigned"),
    ("review_requested", "github.pull-request.review-requested"),
    (
        "review_request_removed",
        "github.pull-request.review-request_removed",
    ),
    ("labeled", "github.pull-request.labeled"),
    ("unlabeled", "github.pull-request.unlabeled"),
    ("opened", "github.pull-request.opened"),
    ("edited", "github.pull-request.edited"),
    ("closed", "github.pull-request.closed"),
    ("reopened", "github.pull-request.reopened"),
    ("synchronize", "github.pull-request.synchronized"),
];

/// Classifies a GitHub webhook.
///
/// # Arguments
///
/// * `event_type` - The validated `x-github-event` header value
/// * `delivery_id` - The validated `x-github-delivery` header value
/// * `payload` - The webhook body, forwarded verbatim in event bodies
pub fn classify_github(
    event_type: &str,
    delivery_id: &DeliveryId,
    payload: &Value,
) -> GithubOutcome {
    match event_type {
        "ping" => GithubOutcome::Pong,
        "push" => GithubOutcome::Publish(vec![github_event(
            registry::GITHUB_PUSHED,
            delivery_id,
            payload,
        )]),
        "create" => {
            let name = match ref_type(payload) {
                Some("branch") => Some(registry::GITHUB_BRANCH_CREATED),
                Some("tag") => Some(registry::GITHUB_TAG_CREATED),
                Some("repository") => Some(registry::GITHUB_REPOSITORY_CREATED),
                _ => None,
            };
            GithubOutcome::Publish(
                name.map(|n| vec![github_event(n, delivery_id, payload)])
                    .unwrap_or_default(),
            )
        }
        "delete" => {
            let name = match ref_type(payload) {
                Some("branch") => Some(registry::GITHUB_BRANCH_DELETED),
                Some("tag") => Some(registry::GITHUB_TAG_DELETED),
                _ => None,
            };
            GithubOutcome::Publish(
                name.map(|n| vec![github_event(n, delivery_id, payload)])
                    .unwrap_or_default(),
            )
        }
        "pull_request" => {
            let action = payload.get("action").and_then(Value::as_str);
            let name = action.and_then(|a| {
                PULL_REQUEST_EVENTS
                    .iter()
                    .find(|(candidate, _)| *candidate == a)
                    .map(|(_, name)| *name)
            });
            GithubOutcome::Publish(
                name.map(|n| vec![github_event(n, delivery_id, payload)])
                    .unwrap_or_default(),
            )
        }
        _ => GithubOutcome::Ignored,
    }
}

fn ref_type(payload: &Value) -> Option<&str> {
    payload.get("ref_type").and_then(Value::as_str)
}

fn github_event(name: &'static str, delivery_id: &DeliveryId, payload: &Value) -> ClassifiedEvent {
    ClassifiedEvent::new(
        name,
        json!({
            "deliveryId": delivery_id,
            "payload": payload,
        }),
    )
}

/// How a Stripe webhook should be answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StripeOutcome {
    /// A handled invoice event.
    Publish(ClassifiedEvent),
    /// A recognized-but-unhandled event type: reply 204, publish nothing.
    Unhandled,
}

/// Classifies a Stripe event by its `type` field.
///
/// The event body carries only identifiers (`stripeEventId`, and
/// `stripeCustomerId` when present); workers retrieve the full event through
/// the Stripe API rather than trusting a relayed copy.
pub fn classify_stripe(payload: &StripePayload) -> StripeOutcome {
    let name = match payload.event_type.as_str() {
        "invoice.created" => registry::STRIPE_INVOICE_CREATED,
        "invoice.payment_succeeded" => registry::STRIPE_INVOICE_PAYMENT_SUCCEEDED,
        "invoice.payment_failed" => registry::STRIPE_INVOICE_PAYMENT_FAILED,
        _ => return StripeOutcome::Unhandled,
    };

    let mut body = json!({ "stripeEventId": payload.id });
    if let Some(customer) = payload.customer_id() {
        body["stripeCustomerId"] = json!(customer);
    }

    StripeOutcome::Publish(ClassifiedEvent::new(name, body))
}

/// Classifies a Datadog webhook: the validated payload is republished
/// verbatim under `datadog.hook.received`.
pub fn classify_datadog(payload: &DatadogPayload) -> ClassifiedEvent {
    ClassifiedEvent::new(registry::DATADOG_HOOK_RECEIVED, json!(payload))
}

/// Classifies a Prometheus Alertmanager webhook: one
/// `prometheus.alert.received` event per element of the `alerts` array, in
/// array order. The whole-batch envelope is never republished.
pub fn classify_prometheus(hook: &PrometheusHook) -> Vec<ClassifiedEvent> {
    hook.alerts
        .iter()
        .map(|alert| ClassifiedEvent::new(registry::PROMETHEUS_ALERT_RECEIVED, alert.clone()))
        .collect()
}

/// Classifies a psad webhook: the validated payload is republished verbatim
/// under `psad.alert.received`.
pub fn classify_psad(payload: &PsadPayload) -> ClassifiedEvent {
    ClassifiedEvent::new(registry::PSAD_ALERT_RECEIVED, json!(payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::webhooks::schema;
    use serde_json::json;

    fn delivery() -> DeliveryId {
        DeliveryId::new("some-delivery-id")
    }

    fn expect_single(outcome: GithubOutcome) -> ClassifiedEvent {
        match outcome {
            GithubOutcome::Publish(mut events) => {
                assert_eq!(events.len(), 1, "expected exactly one event");
                events.remove(0)
            }
            other => panic!("expected Publish, got {other:?}"),
        }
    }

    // ─── github ───

    #[test]
    fn ping_is_answered_without_publishing() {
        assert_eq!(
            classify_github("ping", &delivery(), &json!({ "zen": "zen string" })),
            GithubOutcome::Pong
        );
    }

    #[test]
    fn push_maps_to_github_pushed() {
        let payload = json!({ "ref": "refs/heads/main" });
        let event = expect_single(classify_github("push", &delivery(), &payload));

        assert_eq!(event.name, "github.pushed");
        assert_eq!(
            event.body,
            json!({
                "deliveryId": "some-delivery-id",
                "payload": { "ref": "refs/heads/main" }
            })
        );
    }

    #[test]
    fn create_maps_by_ref_type() {
        for (ref_type, name) in [
            ("branch", "github.branch.created"),
            ("tag", "github.tag.created"),
            ("repository", "github.repository.created"),
        ] {
            let payload = json!({ "ref_type": ref_type });
            let event = expect_single(classify_github("create", &delivery(), &payload));
            assert_eq!(event.name, name, "ref_type {ref_type}");
        }
    }

    #[test]
    fn delete_maps_branch_and_tag_only() {
        for (ref_type, name) in [
            ("branch", "github.branch.deleted"),
            ("tag", "github.tag.deleted"),
        ] {
            let payload = json!({ "ref_type": ref_type });
            let event = expect_single(classify_github("delete", &delivery(), &payload));
            assert_eq!(event.name, name, "ref_type {ref_type}");
        }

        // Repositories can be created but not deleted through this pipeline.
        let payload = json!({ "ref_type": "repository" });
        assert_eq!(
            classify_github("delete", &delivery(), &payload),
            GithubOutcome::Publish(vec![])
        );
    }

    #[test]
    fn create_with_unknown_ref_type_is_handled_but_publishes_nothing() {
        for payload in [json!({ "ref_type": "wiki" }), json!({})] {
            assert_eq!(
                classify_github("create", &delivery(), &payload),
                GithubOutcome::Publish(vec![])
            );
        }
    }

    #[test]
    fn pull_request_actions_map_to_hyphenated_names() {
        for (action, name) in [
            ("assigned", "github.pull-request.assigned"),
            ("unassigned", "github.pull-request.unassigned"),
            ("review_requested", "github.pull-request.review-requested"),
            (
                "review_request_removed",
                "github.pull-request.review-request_removed",
            ),
            ("labeled", "github.pull-request.labeled"),
            ("unlabeled", "github.pull-request.unlabeled"),
            ("opened", "github.pull-request.opened"),
            ("edited", "github.pull-request.edited"),
            ("closed", "github.pull-request.closed"),
            ("reopened", "github.pull-request.reopened"),
        ] {
            let payload = json!({ "action": action, "number": 11 });
            let event = expect_single(classify_github("pull_request", &delivery(), &payload));
            assert_eq!(event.name, name, "action {action}");
            assert_eq!(event.body["payload"]["action"], json!(action));
        }
    }

    #[test]
    fn pull_request_synchronize_maps_to_synchronized() {
        let payload = json!({ "action": "synchronize" });
        let event = expect_single(classify_github("pull_request", &delivery(), &payload));
        assert_eq!(event.name, "github.pull-request.synchronized");
    }

    #[test]
    fn pull_request_unknown_action_is_handled_but_publishes_nothing() {
        let payload = json!({ "action": "foo" });
        assert_eq!(
            classify_github("pull_request", &delivery(), &payload),
            GithubOutcome::Publish(vec![])
        );
    }

    #[test]
    fn unknown_event_types_are_ignored() {
        for event_type in ["watch", "star", "fork", "deployment", "hello"] {
            assert_eq!(
                classify_github(event_type, &delivery(), &json!({})),
                GithubOutcome::Ignored,
                "event {event_type}"
            );
        }
    }

    #[test]
    fn every_derivable_github_name_is_in_the_registry() {
        use crate::registry::is_known_event;

        for (_, name) in PULL_REQUEST_EVENTS {
            assert!(is_known_event(name), "{name} missing from registry");
        }
        for name in [
            "github.pushed",
            "github.branch.created",
            "github.branch.deleted",
            "github.tag.created",
            "github.tag.deleted",
            "github.repository.created",
        ] {
            assert!(is_known_event(name), "{name} missing from registry");
        }
    }

    // ─── stripe ───

    fn stripe_payload(event_type: &str) -> schema::StripePayload {
        let body = serde_json::to_vec(&json!({
            "id": "evt_123",
            "type": event_type,
            "data": { "object": { "customer": "cus_9" } }
        }))
        .unwrap();
        schema::stripe(&body).unwrap()
    }

    #[test]
    fn stripe_invoice_types_map_to_hyphenated_names() {
        for (event_type, name) in [
            ("invoice.created", "stripe.invoice.created"),
            (
                "invoice.payment_succeeded",
                "stripe.invoice.payment-succeeded",
            ),
            ("invoice.payment_failed", "stripe.invoice.payment-failed"),
        ] {
            match classify_stripe(&stripe_payload(event_type)) {
                StripeOutcome::Publish(event) => {
                    assert_eq!(event.name, name);
                    assert_eq!(
                        event.body,
                        json!({ "stripeEventId": "evt_123", "stripeCustomerId": "cus_9" })
                    );
                }
                StripeOutcome::Unhandled => panic!("{event_type} should be handled"),
            }
        }
    }

    #[test]
    fn stripe_body_omits_customer_when_absent() {
        let body = serde_json::to_vec(&json!({ "id": "evt_1", "type": "invoice.created" })).unwrap();
        let payload = schema::stripe(&body).unwrap();

        match classify_stripe(&payload) {
            StripeOutcome::Publish(event) => {
                assert_eq!(event.body, json!({ "stripeEventId": "evt_1" }));
            }
            StripeOutcome::Unhandled => panic!("should be handled"),
        }
    }

    #[test]
    fn stripe_other_types_are_unhandled() {
        for event_type in ["customer.subscription.created", "charge.refunded", ""] {
            assert_eq!(
                classify_stripe(&stripe_payload(event_type)),
                StripeOutcome::Unhandled,
                "type {event_type}"
            );
        }
    }

    // ─── datadog / prometheus / psad ───

    #[test]
    fn datadog_republishes_the_validated_payload() {
        let body = serde_json::to_vec(&json!({
            "id": "123",
            "event_title": "disk filling up",
            "event_msg": "[RUNNABLE_DATA]type=disk_filled[RUNNABLE_DATA]",
            "date": "1466986526",
            "alert_transition": "Triggered",
            "secret": "s",
        }))
        .unwrap();
        let payload = schema::datadog(&body, "s").unwrap();

        let event = classify_datadog(&payload);
        assert_eq!(event.name, "datadog.hook.received");
        assert_eq!(event.body["event_title"], json!("disk filling up"));
        assert_eq!(event.body["alert_transition"], json!("Triggered"));
    }

    #[test]
    fn prometheus_fans_out_one_event_per_alert() {
        let alerts: Vec<_> = (0..3)
            .map(|i| {
                json!({
                    "status": if i == 1 { "resolved" } else { "firing" },
                    "labels": {
                        "githubOrgId": "20547680",
                        "hostIp": format!("10.4.129.{i}"),
                        "type": "unresponsive"
                    }
                })
            })
            .collect();
        let body = serde_json::to_vec(&json!({ "alerts": alerts })).unwrap();
        let hook = schema::prometheus(&body).unwrap();

        let events = classify_prometheus(&hook);
        assert_eq!(events.len(), 3);
        for (i, event) in events.iter().enumerate() {
            assert_eq!(event.name, "prometheus.alert.received");
            assert_eq!(event.body, alerts[i], "array order preserved");
        }
    }

    #[test]
    fn psad_republishes_the_validated_payload() {
        let body = serde_json::to_vec(&json!({ "containerId": "abc", "extra": 1 })).unwrap();
        let payload = schema::psad(&body).unwrap();

        let event = classify_psad(&payload);
        assert_eq!(event.name, "psad.alert.received");
        assert_eq!(event.body, json!({ "containerId": "abc" }));
    }
}
