//! Configuration management for CradleWatch

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::EmergencyContact;

/// Main configuration struct
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Vital-sign sampling configuration
    pub vitals: VitalsConfig,

    /// Audio anomaly monitoring configuration
    pub audio: AudioConfig,

    /// Alert engine configuration
    pub alerting: AlertingConfig,

    /// Emergency contacts for high-priority dispatch
    pub contacts: ContactsConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from an optional TOML file plus `CRADLEWATCH_*`
    /// environment overrides, falling back to defaults for anything unset
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path));
        } else {
            builder = builder.add_source(config::File::with_name("cradlewatch").required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("CRADLEWATCH")
                .separator("__")
                .try_parsing(true),
        );

        builder
            .build()
            .and_then(|settings| settings.try_deserialize())
            .map_err(|e| Error::config(e.to_string()))
    }
}

/// Vital-sign sampling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VitalsConfig {
    /// Interval between sensor samples
    #[serde(with = "humantime_serde")]
    pub sample_interval: Duration,

    /// Seed for the signal generator; random when unset
    pub seed: Option<u64>,
}

impl Default for VitalsConfig {
    fn default() -> Self {
        Self {
            sample_interval: Duration::from_secs(2),
            seed: None,
        }
    }
}

/// Audio anomaly monitoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Interval between microphone samples
    #[serde(with = "humantime_serde")]
    pub sample_interval: Duration,

    /// Intensity above which crying is reported, in [0, 100]
    pub crying_threshold: f64,

    /// How long the detected flag stays set after a detection
    #[serde(with = "humantime_serde")]
    pub detection_cooldown: Duration,

    /// Whether the microphone starts enabled
    pub enabled: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_interval: Duration::from_secs(1),
            crying_threshold: 70.0,
            detection_cooldown: Duration::from_secs(3),
            enabled: true,
        }
    }
}

/// Alert engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertingConfig {
    /// Capacity of the lifecycle broadcast channel
    pub event_buffer: usize,

    /// Capacity of the notification dispatch queue
    pub dispatch_buffer: usize,

    /// Webhook URL notifications are posted to; log-only when unset
    pub webhook_url: Option<String>,
}

impl Default for AlertingConfig {
    fn default() -> Self {
        Self {
            event_buffer: 64,
            dispatch_buffer: 32,
            webhook_url: None,
        }
    }
}

/// Emergency contact list configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactsConfig {
    /// Contacts notified on high-priority alerts
    pub emergency: Vec<EmergencyContact>,
}

impl Default for ContactsConfig {
    fn default() -> Self {
        Self {
            emergency: EmergencyContact::defaults(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,

    /// Log format (json or pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
