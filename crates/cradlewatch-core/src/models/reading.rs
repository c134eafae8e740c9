//! Sensor reading data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Incubator orientation relative to gravity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    /// Lateral tilt
    pub x: f64,
    /// Longitudinal tilt
    pub y: f64,
    /// Vertical axis, centered on gravity (~9.8)
    pub z: f64,
}

/// A timestamped vector of sensor channel values
///
/// Values are clamped to their physical plausible range at generation time,
/// so a `Reading` is always in-range by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// When the reading was sampled
    pub timestamp: DateTime<Utc>,

    /// Heart rate in beats per minute
    pub heart_rate: f64,

    /// Body temperature in degrees Celsius
    pub temperature: f64,

    /// Relative humidity in percent
    pub humidity: f64,

    /// Oxygen saturation in percent
    pub oxygen_level: f64,

    /// Orientation vector
    pub orientation: Orientation,
}

impl Reading {
    /// Baseline reading used to seed the random walk
    pub fn baseline() -> Self {
        Self {
            timestamp: Utc::now(),
            heart_rate: 145.0,
            temperature: 36.8,
            humidity: 65.0,
            oxygen_level: 98.0,
            orientation: Orientation {
                x: 0.2,
                y: -0.1,
                z: 9.8,
            },
        }
    }
}

/// Classification of a single channel against its clinical band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChannelStatus {
    /// Within the clinical band
    #[default]
    Normal,
    /// Below the clinical band
    Low,
    /// Above the clinical band
    High,
}

impl ChannelStatus {
    /// Whether the channel is outside its clinical band
    pub fn is_abnormal(self) -> bool {
        self != Self::Normal
    }
}

/// Sensor channels subject to clinical threshold alerting
///
/// Humidity is monitored for display but never alerted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VitalSign {
    /// Heart rate channel
    HeartRate,
    /// Body temperature channel
    Temperature,
    /// Oxygen saturation channel
    Oxygen,
}

impl VitalSign {
    /// All alerting channels, in evaluation order
    pub const ALL: [VitalSign; 3] = [Self::HeartRate, Self::Temperature, Self::Oxygen];

    /// Stable key prefix used to build alert source keys
    pub fn key(self) -> &'static str {
        match self {
            Self::HeartRate => "heart_rate",
            Self::Temperature => "temperature",
            Self::Oxygen => "oxygen",
        }
    }

    /// Stable condition key for an abnormal status on this channel
    ///
    /// Returns `None` for `Normal` since a normal channel has no condition.
    pub fn source_key(self, status: ChannelStatus) -> Option<String> {
        match status {
            ChannelStatus::Normal => None,
            ChannelStatus::Low => Some(format!("{}_low", self.key())),
            ChannelStatus::High => Some(format!("{}_high", self.key())),
        }
    }

    /// Message surfaced to clinicians when this channel goes abnormal
    pub fn alert_message(self) -> &'static str {
        match self {
            Self::HeartRate => "Heart rate abnormal",
            Self::Temperature => "Temperature alert",
            Self::Oxygen => "Low oxygen levels",
        }
    }
}

/// Per-channel classification of one reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VitalStatuses {
    /// Heart rate status
    pub heart_rate: ChannelStatus,
    /// Temperature status
    pub temperature: ChannelStatus,
    /// Oxygen saturation status
    pub oxygen: ChannelStatus,
}

impl VitalStatuses {
    /// Status of a given channel
    pub fn get(&self, sign: VitalSign) -> ChannelStatus {
        match sign {
            VitalSign::HeartRate => self.heart_rate,
            VitalSign::Temperature => self.temperature,
            VitalSign::Oxygen => self.oxygen,
        }
    }

    /// Whether any channel is outside its band
    pub fn any_abnormal(&self) -> bool {
        VitalSign::ALL.iter().any(|s| self.get(*s).is_abnormal())
    }
}

/// A transient audio anomaly observation
///
/// Never stored; only transformed into an alert when the intensity exceeds
/// the crying threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioEvent {
    /// Crying intensity in [0, 100]
    pub intensity: f64,

    /// When the intensity was sampled
    pub timestamp: DateTime<Utc>,
}
