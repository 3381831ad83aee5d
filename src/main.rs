//! queue-alerter daemon
//!
//! Run with: cargo run
//!
//! Environment variables:
//! - APP_CONFIG: YAML file listing `{queue, threshold}` checks (required)
//! - RABBITMQ_CONFIG_PATH: directory containing the `rabbitmq_client_uri` file (required)
//! - SERVICE_KEY: PagerDuty service key (required)
//! - RABBITMQ_NO_SSL: set to `true` to use plain HTTP for the management API
//! - RABBITMQ_MANAGEMENT_PORT: management API port (default: 15672)
//! - CHECK_EVERY: seconds between checks (default: 300)
//! - CHECK_CONCURRENCY: queues checked at once (default: 1)
//! - RUST_LOG: Log level (default: info)

use queue_alerter::config::Settings;
use queue_alerter::daemon::run_daemon;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "queue_alerter=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };

    tracing::info!(
        "queue-alerter {} starting with {:?}",
        env!("CARGO_PKG_VERSION"),
        settings
    );

    run_daemon(settings).await
}
