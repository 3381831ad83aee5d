use std::path::PathBuf;
use std::time::Duration;

use super::ConfigError;

/// Default seconds between check runs
pub const DEFAULT_CHECK_EVERY_SECS: u64 = 300;

/// Process settings
#[derive(Clone)]
pub struct Settings {
    /// YAML file with the queue checks
    pub app_config: PathBuf,
    /// Directory holding the `rabbitmq_client_uri` file
    pub rabbitmq_config_path: PathBuf,
    /// PagerDuty service key
    pub service_key: String,
    /// Use HTTPS for the management API
    pub use_tls: bool,
    /// Time between check runs
    pub check_every: Duration,
    /// Management API port, if not the broker default
    pub management_port: Option<u16>,
    /// Maximum number of queues checked at once
    pub check_concurrency: usize,
}

impl Settings {
    /// Read settings from the process environment
    /// APP_CONFIG=/etc/queue-alerter/config.yaml
    /// RABBITMQ_CONFIG_PATH=/etc/rabbitmq-secret
    /// SERVICE_KEY=...
    /// RABBITMQ_NO_SSL=false
    /// CHECK_EVERY=300
    /// RABBITMQ_MANAGEMENT_PORT=15672
    /// CHECK_CONCURRENCY=1
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings through `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let app_config = get("APP_CONFIG")
            .map(PathBuf::from)
            .ok_or(ConfigError::MissingSetting("APP_CONFIG"))?;
        let rabbitmq_config_path = get("RABBITMQ_CONFIG_PATH")
            .map(PathBuf::from)
            .ok_or(ConfigError::MissingSetting("RABBITMQ_CONFIG_PATH"))?;
        let service_key =
            get("SERVICE_KEY").ok_or(ConfigError::MissingSetting("SERVICE_KEY"))?;

        let use_tls = get("RABBITMQ_NO_SSL")
            .map(|v| !v.eq_ignore_ascii_case("true"))
            .unwrap_or(true);

        let check_every = match get("CHECK_EVERY") {
            Some(v) => Duration::from_secs(parse_setting("CHECK_EVERY", &v)?),
            None => Duration::from_secs(DEFAULT_CHECK_EVERY_SECS),
        };

        let management_port = get("RABBITMQ_MANAGEMENT_PORT")
            .map(|v| parse_setting("RABBITMQ_MANAGEMENT_PORT", &v))
            .transpose()?;

        let check_concurrency = match get("CHECK_CONCURRENCY") {
            Some(v) => match parse_setting::<usize>("CHECK_CONCURRENCY", &v)? {
                0 => {
                    return Err(ConfigError::InvalidSetting {
                        name: "CHECK_CONCURRENCY",
                        value: v,
                    })
                }
                n => n,
            },
            None => 1,
        };

        Ok(Self {
            app_config,
            rabbitmq_config_path,
            service_key,
            use_tls,
            check_every,
            management_port,
            check_concurrency,
        })
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("app_config", &self.app_config)
            .field("rabbitmq_config_path", &self.rabbitmq_config_path)
            .field("service_key", &"<redacted>")
            .field("use_tls", &self.use_tls)
            .field("check_every", &self.check_every)
            .field("management_port", &self.management_port)
            .field("check_concurrency", &self.check_concurrency)
            .finish()
    }
}

fn parse_setting<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidSetting {
        name,
        value: value.to_string(),
    })
}
