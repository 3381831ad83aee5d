//! Queue threshold alerting
//!
//! Compares queue depths to configured thresholds and raises PagerDuty
//! incidents for queues that exceed them.

pub mod checker;
pub mod event;
pub mod notifier;

pub use checker::{breach_message, CheckError, CheckReport, CheckRunner, QueueOutcome};
pub use event::{EventType, IncidentDetails, IncidentEvent};
pub use notifier::{AlertError, AlertSink, PagerDutyNotifier, PAGERDUTY_EVENTS_URL};
