//! Alerting for CradleWatch
//!
//! The alert ledger state machine plus notification fan-out for
//! high-priority raises.

mod dispatcher;
mod engine;

pub use dispatcher::{
    run_dispatcher, spawn_dispatcher, NotificationError, NotificationResult, NotificationSender,
    Notifier,
};
pub use engine::{AlertEngine, CRYING_SOURCE_KEY};
