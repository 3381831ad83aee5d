//! Incident notifications

use std::time::Duration;

use async_trait::async_trait;

use super::event::IncidentEvent;

/// PagerDuty generic events endpoint
pub const PAGERDUTY_EVENTS_URL: &str =
    "https://events.pagerduty.com/generic/2010-04-15/create_event.json";

/// Destination for incident triggers
#[async_trait]
pub trait AlertSink: Send + Sync {
    /// Trigger the incident `incident_key`, returning the provider's acknowledgment
    async fn trigger(
        &self,
        message: &str,
        incident_key: &str,
        queue_size: Option<u64>,
    ) -> Result<serde_json::Value, AlertError>;
}

/// Sends incident events to PagerDuty
#[derive(Clone)]
pub struct PagerDutyNotifier {
    client: reqwest::Client,
    events_url: String,
    service_key: String,
}

impl PagerDutyNotifier {
    /// Create a notifier. The service key is required.
    pub fn new(service_key: impl Into<String>) -> Result<Self, AlertError> {
        let service_key = service_key.into();
        if service_key.is_empty() {
            return Err(AlertError::MissingServiceKey);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AlertError::Client(e.to_string()))?;

        Ok(Self {
            client,
            events_url: PAGERDUTY_EVENTS_URL.to_string(),
            service_key,
        })
    }

    /// Send events somewhere other than PagerDuty's public endpoint
    pub fn with_events_url(mut self, events_url: impl Into<String>) -> Self {
        self.events_url = events_url.into();
        self
    }

    pub fn events_url(&self) -> &str {
        &self.events_url
    }

    /// Post one event. No retry; the provider deduplicates by incident key.
    pub async fn send_event(&self, event: &IncidentEvent) -> Result<serde_json::Value, AlertError> {
        let response = self
            .client
            .post(&self.events_url)
            .json(event)
            .send()
            .await
            .map_err(|e| AlertError::Network(format!("Failed to send event: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = crate::response::error_body(response).await;
            return Err(AlertError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let ack: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AlertError::MalformedResponse(e.to_string()))?;

        tracing::debug!(
            incident_key = %event.incident_key,
            event_type = ?event.event_type,
            "Incident event sent"
        );

        Ok(ack)
    }
}

#[async_trait]
impl AlertSink for PagerDutyNotifier {
    async fn trigger(
        &self,
        message: &str,
        incident_key: &str,
        queue_size: Option<u64>,
    ) -> Result<serde_json::Value, AlertError> {
        let event = IncidentEvent::trigger(&self.service_key, incident_key, message, queue_size);
        self.send_event(&event).await
    }
}

impl std::fmt::Debug for PagerDutyNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagerDutyNotifier")
            .field("events_url", &self.events_url)
            .field("service_key", &"<redacted>")
            .finish()
    }
}

/// Notifier errors
#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    #[error("You must specify a PagerDuty service key to send alerts to")]
    MissingServiceKey,

    #[error("Could not create HTTP client: {0}")]
    Client(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Alerting service returned {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Could not parse alerting service response: {0}")]
    MalformedResponse(String),
}
