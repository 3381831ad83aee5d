//! Queue depth checker

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Serialize;

use super::notifier::{AlertError, AlertSink};
use crate::broker::{BrokerError, QueueDepthSource};
use crate::config::QueueCheckSpec;

/// Result of checking one queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueOutcome {
    pub queue: String,
    pub depth: u64,
    pub threshold: u64,
    /// Whether an incident was triggered
    pub breached: bool,
}

/// Result of one pass over all configured queues
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub checked_at: DateTime<Utc>,
    /// One entry per check, in configuration order
    pub outcomes: Vec<QueueOutcome>,
}

impl CheckReport {
    /// Outcomes that triggered an incident
    pub fn breached(&self) -> impl Iterator<Item = &QueueOutcome> {
        self.outcomes.iter().filter(|o| o.breached)
    }
}

/// Checks queue depths against thresholds and triggers incidents on breach.
///
/// Holds no state between runs; the caller decides how often to run it.
pub struct CheckRunner<S, A> {
    source: S,
    sink: A,
}

impl<S, A> CheckRunner<S, A>
where
    S: QueueDepthSource,
    A: AlertSink,
{
    pub fn new(source: S, sink: A) -> Self {
        Self { source, sink }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn sink(&self) -> &A {
        &self.sink
    }

    /// Check every queue in order.
    ///
    /// The first broker or alerting error aborts the run; queues after it are
    /// not checked.
    pub async fn run_once(&self, specs: &[QueueCheckSpec]) -> Result<CheckReport, CheckError> {
        let checked_at = Utc::now();
        let mut outcomes = Vec::with_capacity(specs.len());

        for spec in specs {
            outcomes.push(self.check_queue(spec).await?);
        }

        Ok(CheckReport {
            checked_at,
            outcomes,
        })
    }

    /// Check up to `max_in_flight` queues at once.
    ///
    /// Outcomes keep configuration order. The first error aborts the run and
    /// drops the checks still in flight.
    pub async fn run_once_concurrent(
        &self,
        specs: &[QueueCheckSpec],
        max_in_flight: usize,
    ) -> Result<CheckReport, CheckError> {
        if max_in_flight <= 1 {
            return self.run_once(specs).await;
        }

        let checked_at = Utc::now();
        let outcomes = stream::iter(specs)
            .map(|spec| self.check_queue(spec))
            .buffered(max_in_flight)
            .try_collect::<Vec<_>>()
            .await?;

        Ok(CheckReport {
            checked_at,
            outcomes,
        })
    }

    /// Check a single queue, triggering its incident if the threshold is exceeded
    pub async fn check_queue(&self, spec: &QueueCheckSpec) -> Result<QueueOutcome, CheckError> {
        let depth = self
            .source
            .queue_depth(&spec.queue)
            .await
            .map_err(|source| CheckError::Broker {
                queue: spec.queue.clone(),
                source,
            })?;

        tracing::info!(
            queue = %spec.queue,
            depth,
            "Currently there are {} messages on the {} queue",
            depth,
            spec.queue
        );

        let breached = spec.is_breached_by(depth);
        if breached {
            tracing::warn!(
                queue = %spec.queue,
                depth,
                threshold = spec.threshold,
                "{} is over the threshold of {} so alerting",
                spec.queue,
                spec.threshold
            );

            let message = breach_message(&spec.queue, depth);
            self.sink
                .trigger(&message, &spec.incident_key(), Some(depth))
                .await
                .map_err(|source| CheckError::Alert {
                    queue: spec.queue.clone(),
                    source,
                })?;
        }

        Ok(QueueOutcome {
            queue: spec.queue.clone(),
            depth,
            threshold: spec.threshold,
            breached,
        })
    }
}

/// Incident description for a queue over its threshold
pub fn breach_message(queue: &str, depth: u64) -> String {
    format!(
        "The queue {} currently has {} messages which exceeds the alert threshold. Please investigate.",
        queue, depth
    )
}

/// Check run errors
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("Could not get depth of queue {queue}: {source}")]
    Broker {
        queue: String,
        #[source]
        source: BrokerError,
    },

    #[error("Could not raise incident for queue {queue}: {source}")]
    Alert {
        queue: String,
        #[source]
        source: AlertError,
    },
}
