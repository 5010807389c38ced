//! AMQP (RabbitMQ) implementation of the publisher gateway.
//!
//! All publishes multiplex over one connection and one channel. Events go to
//! a durable fanout exchange named after the event; tasks go to a durable
//! queue named after the task via the default exchange. The full topology is
//! declared up front at connect time from the static registry, so a publish
//! never races queue creation.
//!
//! Publisher confirms are enabled on the channel and awaited on every
//! publish: when `publish_event` returns `Ok`, the broker has accepted the
//! message for delivery.

use async_trait::async_trait;
use lapin::options::{
    BasicPublishOptions, ConfirmSelectOptions, ExchangeDeclareOptions, QueueDeclareOptions,
};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties, ExchangeKind};
use serde_json::Value;
use tracing::{debug, info};

use crate::registry;

use super::{ensure_known_event, ensure_known_task, PublishError, Publisher};

/// Connection name reported to the broker for operator visibility.
const CONNECTION_NAME: &str = "webhook-relay";

/// A publisher gateway backed by a RabbitMQ connection.
///
/// The boundary owns the lifecycle: construct with [`AmqpPublisher::connect`]
/// at startup, pass it (as `Arc<dyn Publisher>`) into handlers and workers,
/// and call [`AmqpPublisher::disconnect`] on shutdown.
pub struct AmqpPublisher {
    connection: Connection,
    channel: Channel,
}

impl AmqpPublisher {
    /// Connects to the broker and declares the full event/task topology.
    pub async fn connect(url: &str) -> Result<Self, PublishError> {
        let connection = Connection::connect(
            url,
            ConnectionProperties::default().with_connection_name(CONNECTION_NAME.into()),
        )
        .await
        .map_err(|e| PublishError::broker("connection failed", e))?;

        let channel = connection
            .create_channel()
            .await
            .map_err(|e| PublishError::broker("channel creation failed", e))?;

        channel
            .confirm_select(ConfirmSelectOptions::default())
            .await
            .map_err(|e| PublishError::broker("confirm mode selection failed", e))?;

        declare_topology(&channel).await?;

        info!(
            events = registry::EVENTS.len(),
            tasks = registry::TASKS.len(),
            "Connected to broker, topology declared"
        );

        Ok(AmqpPublisher {
            connection,
            channel,
        })
    }

    /// Closes the broker connection.
    pub async fn disconnect(&self) -> Result<(), PublishError> {
        self.connection
            .close(200, "shutting down")
            .await
            .map_err(|e| PublishError::broker("close failed", e))
    }

    async fn publish(
        &self,
        exchange: &str,
        routing_key: &str,
        body: &Value,
    ) -> Result<(), PublishError> {
        let bytes = serde_json::to_vec(body)?;

        let confirm = self
            .channel
            .basic_publish(
                exchange,
                routing_key,
                BasicPublishOptions::default(),
                &bytes,
                BasicProperties::default()
                    .with_delivery_mode(2) // persistent
                    .with_content_type("application/json".into()),
            )
            .await
            .map_err(|e| PublishError::broker("publish failed", e))?;

        confirm
            .await
            .map_err(|e| PublishError::broker("publish confirmation failed", e))?;

        Ok(())
    }
}

#[async_trait]
impl Publisher for AmqpPublisher {
    async fn publish_event(&self, name: &str, body: &Value) -> Result<(), PublishError> {
        ensure_known_event(name)?;
        debug!(event = name, "Publishing event");
        // Fanout exchange named after the event; routing key unused.
        self.publish(name, "", body).await
    }

    async fn publish_task(&self, name: &str, body: &Value) -> Result<(), PublishError> {
        ensure_known_task(name)?;
        debug!(task = name, "Publishing task");
        // Default exchange routes directly to the queue named after the task.
        self.publish("", name, body).await
    }
}

/// Declares every exchange and queue named in the registry.
async fn declare_topology(channel: &Channel) -> Result<(), PublishError> {
    for &event in registry::EVENTS {
        channel
            .exchange_declare(
                event,
                ExchangeKind::Fanout,
                ExchangeDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| PublishError::broker("exchange declaration failed", e))?;
    }

    for &task in registry::TASKS {
        channel
            .queue_declare(
                task,
                QueueDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| PublishError::broker("queue declaration failed", e))?;
    }

    Ok(())
}
