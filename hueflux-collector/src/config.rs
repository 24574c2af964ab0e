//! Configuration for the collector.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use hueflux_common::LoggingConfig;

use crate::normalize::TemperatureUnit;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] json5::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Complete collector configuration.
///
/// Loaded once at startup and passed by reference to the components that
/// need it; immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Hub connection settings.
    pub hub: HubConfig,

    /// InfluxDB sink settings.
    pub influx: InfluxConfig,

    /// Poll interval in seconds (default: 60).
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// Device name map: raw display name -> metric name.
    ///
    /// An entry mapped to `null` drops the device. Devices without an
    /// entry fall back to their (sanitized) display name.
    #[serde(default)]
    pub sensors: HashMap<String, Option<String>>,

    /// Target unit for temperature readings (default: Celsius).
    #[serde(default)]
    pub temperature_units: TemperatureUnit,

    /// Extra fixed tags added to every line.
    ///
    /// A `host` tag is derived automatically unless set here.
    #[serde(default)]
    pub tags: BTreeMap<String, String>,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Hub connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    /// Hub address (hostname or IP).
    pub host: String,

    /// Registered API username.
    pub user: String,
}

/// InfluxDB sink settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfluxConfig {
    /// Full base URL (e.g. "http://influx.local:8086").
    /// Takes precedence over `host`/`port` when set.
    #[serde(default)]
    pub url: Option<String>,

    /// Sink hostname or IP (used when `url` is not set).
    #[serde(default)]
    pub host: Option<String>,

    /// Sink port (default: 8086).
    #[serde(default = "default_influx_port")]
    pub port: u16,

    /// Target database name.
    pub db: String,

    /// Basic-auth username.
    #[serde(default)]
    pub user: Option<String>,

    /// Basic-auth password.
    #[serde(default)]
    pub password: Option<String>,

    /// Write timeout in seconds (default: 5).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Measurement name for all lines (default: "hue").
    #[serde(default = "default_measurement")]
    pub measurement: String,
}

fn default_interval() -> u64 {
    60
}

fn default_influx_port() -> u16 {
    8086
}

fn default_timeout() -> u64 {
    5
}

fn default_measurement() -> String {
    "hue".to_string()
}

impl InfluxConfig {
    /// Base URL of the sink, without a trailing slash.
    pub fn base_url(&self) -> String {
        match &self.url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!(
                "http://{}:{}",
                self.host.as_deref().unwrap_or_default(),
                self.port
            ),
        }
    }

    /// Fully resolved write endpoint.
    pub fn write_url(&self) -> String {
        format!("{}/write?db={}&precision=s", self.base_url(), self.db)
    }
}

impl CollectorConfig {
    /// Load configuration from a JSON5 file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = json5::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a JSON5 string and validate it.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = json5::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_secs == 0 {
            return Err(ConfigError::Validation(
                "interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.hub.host.is_empty() {
            return Err(ConfigError::Validation("hub.host is required".to_string()));
        }
        if self.hub.user.is_empty() {
            return Err(ConfigError::Validation("hub.user is required".to_string()));
        }
        if self.influx.url.is_none() && self.influx.host.is_none() {
            return Err(ConfigError::Validation(
                "influx.url or influx.host is required".to_string(),
            ));
        }
        if self.influx.db.is_empty() {
            return Err(ConfigError::Validation("influx.db is required".to_string()));
        }
        Ok(())
    }
}
