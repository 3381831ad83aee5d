//! PagerDuty incident event payload

use serde::{Deserialize, Serialize};

/// What an event does to its incident
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Trigger,
    Resolve,
    Acknowledge,
}

/// Extra context shown on the incident
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentDetails {
    #[serde(rename = "Queue size")]
    pub queue_size: Option<u64>,
}

/// One event sent to the alerting service
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentEvent {
    pub service_key: String,
    pub event_type: EventType,
    /// Events with the same key belong to the same incident
    pub incident_key: String,
    pub description: String,
    pub details: IncidentDetails,
}

impl IncidentEvent {
    /// Create a trigger event
    pub fn trigger(
        service_key: impl Into<String>,
        incident_key: impl Into<String>,
        description: impl Into<String>,
        queue_size: Option<u64>,
    ) -> Self {
        Self {
            service_key: service_key.into(),
            event_type: EventType::Trigger,
            incident_key: incident_key.into(),
            description: description.into(),
            details: IncidentDetails { queue_size },
        }
    }
}

impl std::fmt::Debug for IncidentEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IncidentEvent")
            .field("service_key", &"<redacted>")
            .field("event_type", &self.event_type)
            .field("incident_key", &self.incident_key)
            .field("description", &self.description)
            .field("details", &self.details)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_payload_shape() {
        let event = IncidentEvent::trigger("skey", "queuesize-jobs", "too many", Some(12));
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "service_key": "skey",
                "event_type": "trigger",
                "incident_key": "queuesize-jobs",
                "description": "too many",
                "details": { "Queue size": 12 }
            })
        );
    }

    #[test]
    fn test_missing_queue_size_is_null() {
        let event = IncidentEvent::trigger("skey", "k", "d", None);
        let json = serde_json::to_value(&event).unwrap();
        assert!(json["details"]["Queue size"].is_null());
    }

    #[test]
    fn test_event_type_names() {
        for (event_type, name) in [
            (EventType::Trigger, "\"trigger\""),
            (EventType::Resolve, "\"resolve\""),
            (EventType::Acknowledge, "\"acknowledge\""),
        ] {
            assert_eq!(serde_json::to_string(&event_type).unwrap(), name);
        }
    }
}
