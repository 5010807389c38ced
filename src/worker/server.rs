//! Broker consumer loop for the worker process.
//!
//! The worker holds its own AMQP connection, declares one durable queue per
//! consumed event (bound to that event's fanout exchange), and processes
//! deliveries concurrently up to the channel's prefetch count: the broker
//! stops handing out messages once that many are unacknowledged, so
//! backpressure lives at the broker, not in an in-process queue.
//!
//! Each delivery is settled exactly once:
//!
//! - handler `Ok` → ack
//! - retryable failure (broker unavailable) → nack with requeue
//! - permanent failure (schema violation, malformed blob, unknown alert
//!   type, undecodable JSON) → nack without requeue, dead-lettering the
//!   message so it is never redelivered

use std::sync::Arc;

use futures::StreamExt;
use lapin::message::Delivery;
use lapin::options::{
    BasicAckOptions, BasicConsumeOptions, BasicNackOptions, BasicQosOptions,
    ExchangeDeclareOptions, QueueBindOptions, QueueDeclareOptions,
};
use lapin::types::FieldTable;
use lapin::{Channel, Connection, ConnectionProperties, Consumer, ExchangeKind};
use serde_json::Value;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::publish::Publisher;
use crate::registry;

use super::{datadog, prometheus, JobError};

/// Connection name reported to the broker for operator visibility.
const CONNECTION_NAME: &str = "webhook-relay-worker";

/// Events this worker subscribes to.
const CONSUMED_EVENTS: &[&str] = &[
    registry::DATADOG_HOOK_RECEIVED,
    registry::PROMETHEUS_ALERT_RECEIVED,
];

/// Errors from the consumer boundary itself (not from job handling).
#[derive(Debug, Error)]
pub enum ConsumeError {
    #[error("broker {context}: {source}")]
    Broker {
        context: &'static str,
        #[source]
        source: lapin::Error,
    },
}

impl ConsumeError {
    fn broker(context: &'static str, source: lapin::Error) -> Self {
        ConsumeError::Broker { context, source }
    }
}

/// The worker's consumer server.
///
/// Constructed by the boundary with an already-connected publisher gateway;
/// owns its consuming connection and the shutdown token.
pub struct WorkerServer {
    connection: Connection,
    channel: Channel,
    publisher: Arc<dyn Publisher>,
    shutdown: CancellationToken,
}

impl WorkerServer {
    /// Connects to the broker and declares the consumed queues.
    ///
    /// `prefetch` bounds the number of in-flight (unacknowledged) messages
    /// processed concurrently by this process.
    pub async fn connect(
        url: &str,
        prefetch: u16,
        publisher: Arc<dyn Publisher>,
    ) -> Result<Self, ConsumeError> {
        let connection = Connection::connect(
            url,
            ConnectionProperties::default().with_connection_name(CONNECTION_NAME.into()),
        )
        .await
        .map_err(|e| ConsumeError::broker("connection failed", e))?;

        let channel = connection
            .create_channel()
            .await
            .map_err(|e| ConsumeError::broker("channel creation failed", e))?;

        channel
            .basic_qos(prefetch, BasicQosOptions::default())
            .await
            .map_err(|e| ConsumeError::broker("qos setup failed", e))?;

        declare_consumed_queues(&channel).await?;

        info!(
            prefetch,
            queues = CONSUMED_EVENTS.len(),
            "Worker connected to broker"
        );

        Ok(WorkerServer {
            connection,
            channel,
            publisher,
            shutdown: CancellationToken::new(),
        })
    }

    /// Returns a token that stops the consumer loops when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Consumes all subscribed queues until the shutdown token fires.
    pub async fn run(&self) -> Result<(), ConsumeError> {
        let mut loops = Vec::with_capacity(CONSUMED_EVENTS.len());

        for &queue in CONSUMED_EVENTS {
            let consumer = self
                .channel
                .basic_consume(
                    queue,
                    &format!("{CONNECTION_NAME}.{queue}"),
                    BasicConsumeOptions::default(),
                    FieldTable::default(),
                )
                .await
                .map_err(|e| ConsumeError::broker("consume setup failed", e))?;

            loops.push(tokio::spawn(consume_loop(
                consumer,
                queue,
                self.publisher.clone(),
                self.shutdown.clone(),
            )));
        }

        for handle in loops {
            if let Err(e) = handle.await {
                error!(error = %e, "Consumer loop panicked");
            }
        }

        Ok(())
    }

    /// Closes the consuming connection.
    pub async fn disconnect(&self) -> Result<(), ConsumeError> {
        self.connection
            .close(200, "shutting down")
            .await
            .map_err(|e| ConsumeError::broker("close failed", e))
    }
}

/// Declares the durable queue for each consumed event and binds it to the
/// event's fanout exchange.
async fn declare_consumed_queues(channel: &Channel) -> Result<(), ConsumeError> {
    for &event in CONSUMED_EVENTS {
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
            .map_err(|e| ConsumeError::broker("exchange declaration failed", e))?;

        channel
            .queue_declare(
                event,
                QueueDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| ConsumeError::broker("queue declaration failed", e))?;

        channel
            .queue_bind(
                event,
                event,
                "",
                QueueBindOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(|e| ConsumeError::broker("queue binding failed", e))?;
    }

    Ok(())
}

/// Pulls deliveries from one queue until shutdown, spawning a task per
/// delivery. Concurrency is bounded by the channel prefetch: the stream
/// stalls once that many deliveries are unacknowledged.
async fn consume_loop(
    mut consumer: Consumer,
    queue: &'static str,
    publisher: Arc<dyn Publisher>,
    shutdown: CancellationToken,
) {
    loop {
        let delivery = tokio::select! {
            _ = shutdown.cancelled() => break,
            next = consumer.next() => match next {
                Some(Ok(delivery)) => delivery,
                Some(Err(e)) => {
                    error!(queue, error = %e, "Failed to receive delivery");
                    continue;
                }
                None => break,
            },
        };

        let publisher = publisher.clone();
        tokio::spawn(async move {
            process_delivery(queue, delivery, publisher).await;
        });
    }

    info!(queue, "Consumer loop stopped");
}

/// Handles one delivery and settles it exactly once.
async fn process_delivery(queue: &'static str, delivery: Delivery, publisher: Arc<dyn Publisher>) {
    let job: Value = match serde_json::from_slice(&delivery.data) {
        Ok(value) => value,
        Err(e) => {
            warn!(queue, error = %e, "Discarding undecodable job");
            settle(&delivery, Settle::Discard).await;
            return;
        }
    };

    match handle_job(queue, &job, publisher.as_ref()).await {
        Ok(()) => settle(&delivery, Settle::Ack).await,
        Err(e) if e.is_retryable() => {
            warn!(queue, error = %e, "Job failed, requeueing");
            settle(&delivery, Settle::Requeue).await;
        }
        Err(e) => {
            warn!(queue, error = %e, "Permanently unprocessable job, discarding");
            settle(&delivery, Settle::Discard).await;
        }
    }
}

/// Routes a job to the handler for its queue.
pub async fn handle_job(
    queue: &str,
    job: &Value,
    publisher: &dyn Publisher,
) -> Result<(), JobError> {
    match queue {
        registry::DATADOG_HOOK_RECEIVED => datadog::handle(job, publisher).await,
        registry::PROMETHEUS_ALERT_RECEIVED => prometheus::handle(job, publisher).await,
        other => Err(JobError::UnhandledType(other.to_string())),
    }
}

enum Settle {
    Ack,
    Requeue,
    Discard,
}

async fn settle(delivery: &Delivery, how: Settle) {
    let result = match how {
        Settle::Ack => delivery.acker.ack(BasicAckOptions::default()).await,
        Settle::Requeue => {
            delivery
                .acker
                .nack(BasicNackOptions {
                    requeue: true,
                    ..Default::default()
                })
                .await
        }
        Settle::Discard => {
            delivery
                .acker
                .nack(BasicNackOptions {
                    requeue: false,
                    ..Default::default()
                })
                .await
        }
    };

    if let Err(e) = result {
        error!(error = %e, "Failed to settle delivery");
    }
}
