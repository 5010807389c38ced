//! Webhook ingestion relay.
//!
//! Receives HTTP callbacks from external SaaS providers (GitHub, Stripe,
//! Datadog, Prometheus Alertmanager, psad), validates each payload against a
//! per-source schema, and republishes normalized events onto a RabbitMQ
//! broker. A companion worker mode subscribes to the monitoring events and
//! fans them out into typed `dock.*` fleet-health events.

pub mod config;
pub mod publish;
pub mod registry;
pub mod server;
pub mod types;
pub mod webhooks;
pub mod worker;

#[cfg(test)]
pub mod test_utils;
