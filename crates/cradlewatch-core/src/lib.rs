//! # CradleWatch
//!
//! Vital-sign telemetry and alerting core for a neonatal incubator monitor.
//!
//! CradleWatch continuously samples simulated physiological sensors,
//! classifies readings against clinical thresholds, deduplicates abnormal
//! conditions into alerts, correlates an independent crying signal, and
//! exposes the alert lifecycle (raised → acknowledged → dismissed) to any
//! number of observers.
//!
//! ## Architecture
//!
//! - **Telemetry**: random-walk signal generation, threshold classification,
//!   two independent periodic producers
//! - **Alerting**: the shared alert ledger state machine plus notification
//!   fan-out for high-priority raises
//! - **CLI**: run the monitor or drive deterministic simulations
//!
//! ## Quick Start
//!
//! ```bash
//! # Run the monitor until Ctrl+C
//! cradlewatch run
//!
//! # Drive 30 deterministic ticks and print the resulting ledger
//! cradlewatch simulate --ticks 30 --seed 42
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod alerting;
pub mod config;
pub mod error;
pub mod models;
pub mod telemetry;

pub use config::Config;
pub use error::{Error, Result};

/// Re-exports for convenience
pub mod prelude {
    pub use crate::alerting::{AlertEngine, NotificationSender, Notifier};
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::models::*;
    pub use crate::telemetry::{Monitor, SignalGenerator, VitalsSampler};
}

pub use telemetry::Monitor;
