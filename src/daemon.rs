//! Long-running check loop

use std::future::Future;
use std::time::Duration;

use crate::alerts::{AlertSink, CheckRunner, PagerDutyNotifier};
use crate::broker::{BrokerClient, BrokerEndpoint, QueueDepthSource};
use crate::config::{load_check_config, QueueCheckSpec, Settings};

/// Load everything `settings` points at, then check queues until Ctrl-C.
///
/// Configuration and credential problems are returned before the first run.
pub async fn run_daemon(settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    let specs = load_check_config(&settings.app_config)?;

    tracing::info!(
        "Starting up queue-alerter, monitoring {} queues every {} seconds:",
        specs.len(),
        settings.check_every.as_secs()
    );
    for spec in &specs {
        tracing::info!(
            "  {}: alert if more than {} messages waiting",
            spec.queue,
            spec.threshold
        );
    }

    let mut endpoint =
        BrokerEndpoint::load_from_dir(&settings.rabbitmq_config_path, settings.use_tls)?;
    if let Some(port) = settings.management_port {
        endpoint = endpoint.with_port(port);
    }
    tracing::info!(
        host = endpoint.host(),
        port = endpoint.port(),
        vhost = endpoint.vhost(),
        tls = endpoint.use_tls(),
        "Using RabbitMQ management API"
    );

    let source = BrokerClient::new(endpoint)?;
    let sink = PagerDutyNotifier::new(settings.service_key.clone())?;
    let runner = CheckRunner::new(source, sink);

    check_loop(
        &runner,
        &specs,
        settings.check_every,
        settings.check_concurrency,
        shutdown_signal(),
    )
    .await;

    tracing::info!("queue-alerter stopped");
    Ok(())
}

/// Run checks every `interval` until `shutdown` resolves. Returns the number of
/// runs started.
///
/// A failed run is logged and the loop carries on with the next one.
pub async fn check_loop<S, A, F>(
    runner: &CheckRunner<S, A>,
    specs: &[QueueCheckSpec],
    interval: Duration,
    max_in_flight: usize,
    shutdown: F,
) -> usize
where
    S: QueueDepthSource,
    A: AlertSink,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut runs = 0;

    loop {
        runs += 1;
        tokio::select! {
            result = runner.run_once_concurrent(specs, max_in_flight) => match result {
                Ok(report) => {
                    tracing::info!(
                        checked = report.outcomes.len(),
                        breached = report.breached().count(),
                        "Check run complete"
                    );
                }
                Err(e) => {
                    tracing::error!(error = %e, "Check run failed");
                }
            },
            _ = &mut shutdown => break,
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = &mut shutdown => break,
        }
    }

    tracing::info!("Shutdown signal received, stopping checks");
    runs
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install CTRL+C signal handler");
        std::future::pending::<()>().await;
    }
}
