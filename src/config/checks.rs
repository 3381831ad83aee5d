//! Queue check definitions and their validation

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use super::ConfigError;

/// One monitored queue and the depth above which it alerts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueCheckSpec {
    /// Queue name on the broker
    pub queue: String,
    /// Alert when more than this many messages are ready
    pub threshold: u64,
}

impl QueueCheckSpec {
    pub fn new(queue: impl Into<String>, threshold: u64) -> Self {
        Self {
            queue: queue.into(),
            threshold,
        }
    }

    /// Whether `depth` breaches this check. Equal to the threshold is not a breach.
    pub fn is_breached_by(&self, depth: u64) -> bool {
        depth > self.threshold
    }

    /// Incident key for this queue, stable across runs
    pub fn incident_key(&self) -> String {
        format!("queuesize-{}", self.queue)
    }
}

/// Read a YAML check configuration from disk and validate it
pub fn load_check_config(path: impl AsRef<Path>) -> Result<Vec<QueueCheckSpec>, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let raw: Value = serde_yaml::from_str(&content)?;
    let specs = validate(&raw)?;

    tracing::debug!(path = %path.display(), queues = specs.len(), "Loaded check configuration");
    Ok(specs)
}

/// Check the structure of a parsed configuration and turn it into check specs.
///
/// The root must be a list; each entry a mapping with a non-empty string `queue`
/// and a non-negative integer `threshold`. Errors name the offending entry index.
pub fn validate(raw: &Value) -> Result<Vec<QueueCheckSpec>, ConfigError> {
    let entries = raw.as_sequence().ok_or(ConfigError::NotAList)?;

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| validate_entry(index, entry))
        .collect()
}

fn validate_entry(index: usize, entry: &Value) -> Result<QueueCheckSpec, ConfigError> {
    let mapping = entry
        .as_mapping()
        .ok_or(ConfigError::EntryNotMapping { index })?;

    let queue = mapping
        .get("queue")
        .ok_or(ConfigError::MissingField {
            index,
            field: "queue",
        })?
        .as_str()
        .ok_or(ConfigError::WrongType {
            index,
            field: "queue",
            expected: "a string",
        })?;
    if queue.is_empty() {
        return Err(ConfigError::InvalidValue {
            index,
            field: "queue",
            reason: "must not be empty",
        });
    }

    let threshold = mapping.get("threshold").ok_or(ConfigError::MissingField {
        index,
        field: "threshold",
    })?;
    let threshold = match threshold.as_u64() {
        Some(t) => t,
        None if threshold.as_i64().is_some() => {
            return Err(ConfigError::InvalidValue {
                index,
                field: "threshold",
                reason: "must not be negative",
            })
        }
        None => {
            return Err(ConfigError::WrongType {
                index,
                field: "threshold",
                expected: "an integer",
            })
        }
    };

    Ok(QueueCheckSpec::new(queue, threshold))
}
