//! Startup configuration: queue checks, process settings and their errors.
//!
//! Everything in here runs once before the check loop starts. Any error is
//! fatal for the process.

pub mod checks;
pub mod settings;

use std::path::PathBuf;

pub use checks::{load_check_config, validate, QueueCheckSpec};
pub use settings::Settings;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration is invalid, the root element should be a list")]
    NotAList,

    #[error("Configuration is invalid, entry {index} is not an object")]
    EntryNotMapping { index: usize },

    #[error("Configuration is invalid, entry {index} does not specify '{field}'")]
    MissingField { index: usize, field: &'static str },

    #[error("Configuration is invalid, entry {index} '{field}' is not {expected}")]
    WrongType {
        index: usize,
        field: &'static str,
        expected: &'static str,
    },

    #[error("Configuration is invalid, entry {index} '{field}' {reason}")]
    InvalidValue {
        index: usize,
        field: &'static str,
        reason: &'static str,
    },

    #[error("Invalid broker URI: {0}")]
    InvalidUri(String),

    #[error("Expected broker URI scheme to be '{expected}' but got '{found}'")]
    SchemeMismatch {
        expected: &'static str,
        found: String,
    },

    #[error("Expected a virtual host in the broker URI")]
    MissingVhost,

    #[error("You must specify {0}")]
    MissingSetting(&'static str),

    #[error("Setting {name} has invalid value '{value}'")]
    InvalidSetting { name: &'static str, value: String },
}
