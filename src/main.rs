use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use webhook_relay::config::Config;
use webhook_relay::publish::{AmqpPublisher, Publisher};
use webhook_relay::server::{build_router, AppState};
use webhook_relay::worker::server::WorkerServer;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "webhook_relay=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let mode = std::env::args().nth(1).unwrap_or_else(|| "serve".to_string());

    match mode.as_str() {
        "serve" => serve(config).await,
        "worker" => worker(config).await,
        other => {
            eprintln!("unknown mode {other:?} (expected \"serve\" or \"worker\")");
            std::process::exit(2);
        }
    }
}

/// Runs the HTTP relay.
async fn serve(config: Config) {
    let publisher: Arc<dyn Publisher> = Arc::new(
        AmqpPublisher::connect(&config.amqp_url)
            .await
            .unwrap_or_else(|e| {
                error!(error = %e, "HTTP relay failed to start");
                std::process::exit(1);
            }),
    );

    let app = build_router(AppState::new(publisher, config.datadog_secret));

    info!("listening on {}", config.http_addr);
    let listener = tokio::net::TcpListener::bind(config.http_addr).await.unwrap();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();
}

/// Runs the queue worker.
async fn worker(config: Config) {
    let publisher: Arc<dyn Publisher> = Arc::new(
        AmqpPublisher::connect(&config.amqp_url)
            .await
            .unwrap_or_else(|e| {
                error!(error = %e, "Worker failed to start");
                std::process::exit(1);
            }),
    );

    let server = WorkerServer::connect(&config.amqp_url, config.prefetch_count, publisher)
        .await
        .unwrap_or_else(|e| {
            error!(error = %e, "Worker failed to start");
            std::process::exit(1);
        });

    let shutdown = server.shutdown_token();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.cancel();
    });

    if let Err(e) = server.run().await {
        error!(error = %e, "Worker stopped with error");
    }
    if let Err(e) = server.disconnect().await {
        error!(error = %e, "Worker disconnect failed");
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        error!("Failed to install shutdown signal handler");
    }
}
