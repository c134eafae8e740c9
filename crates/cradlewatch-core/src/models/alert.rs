//! Alert data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category of an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    /// Immediate clinical attention required
    Emergency,
    /// Abnormal but non-critical condition
    #[default]
    Warning,
    /// Informational
    Info,
}

/// Priority of an alert, drives notification fan-out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Dispatched to emergency contacts on raise
    High,
    /// Surfaced prominently, no dispatch
    #[default]
    Medium,
    /// Background information
    Low,
}

/// An alert in the engine's ledger
///
/// Created on a quiescent-to-open transition of its `source_key`; mutated
/// only by `acknowledge`, removed only by `dismiss`. Consumers always get
/// clones, never references into the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    /// Unique identifier
    pub id: Uuid,

    /// Alert category
    pub kind: AlertKind,

    /// Short human-readable title
    pub title: String,

    /// Detail text shown to clinicians and parents
    pub description: String,

    /// When the alert was raised
    pub created_at: DateTime<Utc>,

    /// Notification priority
    pub priority: Priority,

    /// Whether an operator has acknowledged the alert
    pub acknowledged: bool,

    /// Stable key identifying the condition that produced the alert
    ///
    /// A second occurrence of the same condition is suppressed while an
    /// alert with this key remains in the ledger.
    pub source_key: String,
}

impl Alert {
    /// Create an unacknowledged alert for a condition
    pub fn new(
        kind: AlertKind,
        priority: Priority,
        title: impl Into<String>,
        description: impl Into<String>,
        source_key: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            title: title.into(),
            description: description.into(),
            created_at: Utc::now(),
            priority,
            acknowledged: false,
            source_key: source_key.into(),
        }
    }
}

/// Ledger mutation broadcast to subscribers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AlertEvent {
    /// A new alert entered the ledger
    Raised(Alert),
    /// An operator acknowledged an alert
    Acknowledged(Alert),
    /// An operator dismissed an alert; it is no longer in the ledger
    Dismissed(Alert),
}

impl AlertEvent {
    /// The alert the event refers to
    pub fn alert(&self) -> &Alert {
        match self {
            Self::Raised(a) | Self::Acknowledged(a) | Self::Dismissed(a) => a,
        }
    }
}

/// Unacknowledged alert counts by kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertStats {
    /// Unacknowledged emergency alerts
    pub emergency: usize,
    /// Unacknowledged warning alerts
    pub warning: usize,
    /// Unacknowledged info alerts
    pub info: usize,
    /// Total alerts in the ledger, acknowledged included
    pub total: usize,
}
