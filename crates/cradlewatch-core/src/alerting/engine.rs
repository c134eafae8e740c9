//! Alert ledger state machine
//!
//! Tracks one `Quiescent`/`Open` state per condition key. A condition is
//! Open exactly while an alert with its key sits in the ledger, so the
//! dedup check and the re-open-after-dismiss behavior fall out of ledger
//! membership alone. Alerts never auto-resolve when the vital recovers;
//! clinical policy requires an operator to dismiss them.

use parking_lot::RwLock;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{
    Alert, AlertEvent, AlertKind, AlertStats, Priority, VitalSign, VitalStatuses,
};

/// Condition key for audio anomaly alerts
pub const CRYING_SOURCE_KEY: &str = "crying";

/// The shared alert engine
///
/// All mutations go through the inner write lock, so a dedup
/// check-and-create is atomic across the concurrent producers.
pub struct AlertEngine {
    ledger: RwLock<Vec<Alert>>,
    events: broadcast::Sender<AlertEvent>,
    dispatch: Option<mpsc::Sender<Alert>>,
    crying_threshold: f64,
}

impl AlertEngine {
    /// Create an engine with no notification dispatch
    pub fn new(event_buffer: usize, crying_threshold: f64) -> Self {
        let (events, _) = broadcast::channel(event_buffer.max(1));
        Self {
            ledger: RwLock::new(Vec::new()),
            events,
            dispatch: None,
            crying_threshold,
        }
    }

    /// Attach the notification dispatch queue
    ///
    /// Every high-priority raise enqueues the alert exactly once; a full or
    /// closed queue is logged and the alert is kept regardless.
    pub fn with_dispatch(mut self, dispatch: mpsc::Sender<Alert>) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    /// Subscribe to ledger mutations
    pub fn subscribe(&self) -> broadcast::Receiver<AlertEvent> {
        self.events.subscribe()
    }

    /// Evaluate one classified sample against the ledger
    ///
    /// Raises an alert for every abnormal channel whose condition key is
    /// currently quiescent. Returns the alerts raised by this sample.
    pub fn observe(&self, statuses: &VitalStatuses) -> Vec<Alert> {
        let mut raised = Vec::new();

        for sign in VitalSign::ALL {
            let status = statuses.get(sign);
            let Some(source_key) = sign.source_key(status) else {
                continue;
            };

            if let Some(alert) = self.raise_if_quiescent(
                AlertKind::Emergency,
                Priority::High,
                "Medical Alert",
                sign.alert_message(),
                &source_key,
            ) {
                raised.push(alert);
            }
        }

        raised
    }

    /// Report an external emergency condition
    ///
    /// The message text itself is the condition key: identical text dedups,
    /// distinct text does not.
    pub fn report_emergency(&self, message: &str) -> Result<Option<Alert>> {
        let message = message.trim();
        if message.is_empty() {
            return Err(Error::validation("emergency message must not be empty"));
        }

        Ok(self.raise_if_quiescent(
            AlertKind::Emergency,
            Priority::High,
            "Medical Alert",
            message,
            message,
        ))
    }

    /// Report a crying intensity sample
    ///
    /// Out-of-range intensities are clamped, never rejected; sampling must
    /// not halt. Intensities at or below the threshold raise nothing.
    pub fn report_crying(&self, intensity: f64) -> Result<Option<Alert>> {
        let intensity = intensity.clamp(0.0, 100.0);
        if intensity <= self.crying_threshold {
            return Ok(None);
        }

        let description = format!(
            "High intensity crying detected ({}%)",
            intensity.round() as i64
        );
        Ok(self.raise_if_quiescent(
            AlertKind::Warning,
            Priority::Medium,
            "Crying Detected",
            description,
            CRYING_SOURCE_KEY,
        ))
    }

    /// Mark an alert acknowledged
    ///
    /// Idempotent and irreversible; the alert keeps blocking re-creation
    /// under its condition key until dismissed.
    pub fn acknowledge(&self, id: Uuid) -> Result<Alert> {
        let alert = {
            let mut ledger = self.ledger.write();
            let alert = ledger
                .iter_mut()
                .find(|a| a.id == id)
                .ok_or_else(|| Error::not_found("alert", id.to_string()))?;
            alert.acknowledged = true;
            let alert = alert.clone();
            let _ = self.events.send(AlertEvent::Acknowledged(alert.clone()));
            alert
        };

        debug!(alert_id = %id, source_key = %alert.source_key, "Alert acknowledged");
        Ok(alert)
    }

    /// Remove an alert from the ledger
    ///
    /// Returns its condition key to quiescent: if the condition persists,
    /// the next evaluation re-opens it with a fresh id.
    pub fn dismiss(&self, id: Uuid) -> Result<Alert> {
        let alert = {
            let mut ledger = self.ledger.write();
            let index = ledger
                .iter()
                .position(|a| a.id == id)
                .ok_or_else(|| Error::not_found("alert", id.to_string()))?;
            let alert = ledger.remove(index);
            let _ = self.events.send(AlertEvent::Dismissed(alert.clone()));
            alert
        };

        debug!(alert_id = %id, source_key = %alert.source_key, "Alert dismissed");
        Ok(alert)
    }

    /// Point-in-time copy of the ledger, most recent first
    pub fn snapshot(&self) -> Vec<Alert> {
        self.ledger.read().clone()
    }

    /// Count of high-priority alerts awaiting acknowledgment
    pub fn pending_high_priority(&self) -> usize {
        self.ledger
            .read()
            .iter()
            .filter(|a| a.priority == Priority::High && !a.acknowledged)
            .count()
    }

    /// Unacknowledged counts by kind plus the ledger total
    pub fn stats(&self) -> AlertStats {
        let ledger = self.ledger.read();
        let mut stats = AlertStats {
            total: ledger.len(),
            ..AlertStats::default()
        };
        for alert in ledger.iter().filter(|a| !a.acknowledged) {
            match alert.kind {
                AlertKind::Emergency => stats.emergency += 1,
                AlertKind::Warning => stats.warning += 1,
                AlertKind::Info => stats.info += 1,
            }
        }
        stats
    }

    /// Create an alert unless its condition key is already open
    fn raise_if_quiescent(
        &self,
        kind: AlertKind,
        priority: Priority,
        title: &str,
        description: impl Into<String>,
        source_key: &str,
    ) -> Option<Alert> {
        let alert = {
            let mut ledger = self.ledger.write();
            if ledger.iter().any(|a| a.source_key == source_key) {
                return None;
            }

            let alert = Alert::new(kind, priority, title, description, source_key);
            ledger.insert(0, alert.clone());
            let _ = self.events.send(AlertEvent::Raised(alert.clone()));
            alert
        };

        info!(
            alert_id = %alert.id,
            source_key = %alert.source_key,
            kind = ?alert.kind,
            priority = ?alert.priority,
            "Alert raised"
        );

        if alert.priority == Priority::High {
            if let Some(dispatch) = &self.dispatch {
                if let Err(e) = dispatch.try_send(alert.clone()) {
                    warn!(alert_id = %alert.id, error = %e, "Notification dispatch queue unavailable");
                }
            }
        }

        Some(alert)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use crate::models::ChannelStatus;

    fn engine() -> AlertEngine {
        AlertEngine::new(16, 70.0)
    }

    fn high_heart_rate() -> VitalStatuses {
        VitalStatuses {
            heart_rate: ChannelStatus::High,
            ..VitalStatuses::default()
        }
    }

    #[test]
    fn persistent_condition_raises_once() {
        let engine = engine();

        let first = engine.observe(&high_heart_rate());
        let second = engine.observe(&high_heart_rate());

        assert_eq!(first.len(), 1);
        assert_eq!(first[0].source_key, "heart_rate_high");
        assert!(second.is_empty());
        assert_eq!(engine.snapshot().len(), 1);
    }

    #[test]
    fn scripted_heart_rate_walk_raises_exactly_once() {
        let engine = engine();
        let mut raised = Vec::new();

        for bpm in [150.0, 160.0, 175.0, 176.0, 172.0] {
            let status = if bpm > 170.0 {
                ChannelStatus::High
            } else {
                ChannelStatus::Normal
            };
            let statuses = VitalStatuses {
                heart_rate: status,
                ..VitalStatuses::default()
            };
            raised.extend(engine.observe(&statuses));
        }

        assert_eq!(raised.len(), 1);
        let ledger = engine.snapshot();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].source_key, "heart_rate_high");
    }

    #[test]
    fn dismiss_reopens_persistent_condition_with_fresh_id() {
        let engine = engine();

        let first = engine.observe(&high_heart_rate()).remove(0);
        engine.dismiss(first.id).unwrap();
        assert!(engine.snapshot().is_empty());

        let second = engine.observe(&high_heart_rate()).remove(0);
        assert_ne!(first.id, second.id);
        assert_eq!(second.source_key, "heart_rate_high");
    }

    #[test]
    fn acknowledge_is_idempotent_and_blocks_recreation() {
        let engine = engine();

        let alert = engine.observe(&high_heart_rate()).remove(0);
        engine.acknowledge(alert.id).unwrap();
        let again = engine.acknowledge(alert.id).unwrap();
        assert!(again.acknowledged);

        // Acknowledged but not dismissed still suppresses the condition.
        assert!(engine.observe(&high_heart_rate()).is_empty());
        assert_eq!(engine.pending_high_priority(), 0);
    }

    #[test]
    fn unknown_id_is_not_found() {
        let engine = engine();
        let id = Uuid::new_v4();

        assert!(matches!(
            engine.acknowledge(id),
            Err(Error::NotFound { .. })
        ));
        assert!(matches!(engine.dismiss(id), Err(Error::NotFound { .. })));
    }

    #[test]
    fn distinct_directions_are_distinct_conditions() {
        let engine = engine();

        engine.observe(&high_heart_rate());
        engine.observe(&VitalStatuses {
            heart_rate: ChannelStatus::Low,
            ..VitalStatuses::default()
        });

        let keys: Vec<_> = engine
            .snapshot()
            .into_iter()
            .map(|a| a.source_key)
            .collect();
        assert_eq!(keys, vec!["heart_rate_low", "heart_rate_high"]);
    }

    #[test]
    fn crying_above_threshold_raises_warning() {
        let engine = engine();

        let alert = engine.report_crying(85.0).unwrap().unwrap();
        assert_eq!(alert.source_key, CRYING_SOURCE_KEY);
        assert_eq!(alert.kind, AlertKind::Warning);
        assert_eq!(alert.priority, Priority::Medium);
        assert_eq!(alert.description, "High intensity crying detected (85%)");
    }

    #[test]
    fn crying_below_threshold_raises_nothing() {
        let engine = engine();
        assert!(engine.report_crying(50.0).unwrap().is_none());
        assert!(engine.snapshot().is_empty());
    }

    #[test]
    fn crying_dedups_while_open() {
        let engine = engine();
        assert!(engine.report_crying(85.0).unwrap().is_some());
        assert!(engine.report_crying(95.0).unwrap().is_none());
        assert_eq!(engine.snapshot().len(), 1);
    }

    #[test]
    fn out_of_range_intensity_is_clamped() {
        let engine = engine();
        let alert = engine.report_crying(250.0).unwrap().unwrap();
        assert_eq!(alert.description, "High intensity crying detected (100%)");
    }

    #[test]
    fn identical_emergency_text_dedups() {
        let engine = engine();
        let message = "Oxygen tank disconnected";

        assert!(engine.report_emergency(message).unwrap().is_some());
        assert!(engine.report_emergency(message).unwrap().is_none());

        let ledger = engine.snapshot();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].description, message);
    }

    #[test]
    fn distinct_emergency_text_does_not_dedup() {
        let engine = engine();
        engine.report_emergency("Oxygen tank disconnected").unwrap();
        engine.report_emergency("Power supply failure").unwrap();
        assert_eq!(engine.snapshot().len(), 2);
    }

    #[test]
    fn empty_emergency_message_is_rejected() {
        let engine = engine();
        assert!(matches!(
            engine.report_emergency("  "),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn ledger_is_most_recent_first() {
        let engine = engine();
        engine.report_emergency("A").unwrap();
        engine.report_emergency("B").unwrap();
        engine.report_emergency("C").unwrap();

        let descriptions: Vec<_> = engine
            .snapshot()
            .into_iter()
            .map(|a| a.description)
            .collect();
        assert_eq!(descriptions, vec!["C", "B", "A"]);
    }

    #[test]
    fn subscribers_see_the_full_lifecycle() {
        let engine = engine();
        let mut events = engine.subscribe();

        let alert = engine.observe(&high_heart_rate()).remove(0);
        engine.acknowledge(alert.id).unwrap();
        engine.dismiss(alert.id).unwrap();

        assert!(matches!(events.try_recv().unwrap(), AlertEvent::Raised(_)));
        assert!(matches!(
            events.try_recv().unwrap(),
            AlertEvent::Acknowledged(a) if a.acknowledged
        ));
        assert!(matches!(
            events.try_recv().unwrap(),
            AlertEvent::Dismissed(a) if a.id == alert.id
        ));
    }

    #[test]
    fn high_priority_raises_enqueue_dispatch_once() {
        let (tx, mut rx) = mpsc::channel(4);
        let engine = AlertEngine::new(16, 70.0).with_dispatch(tx);

        engine.observe(&high_heart_rate());
        engine.observe(&high_heart_rate());
        // Medium priority never dispatches.
        engine.report_crying(90.0).unwrap();

        let job = rx.try_recv().unwrap();
        assert_eq!(job.source_key, "heart_rate_high");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn stats_count_unacknowledged_by_kind() {
        let engine = engine();
        let emergency = engine.report_emergency("Oxygen tank disconnected").unwrap().unwrap();
        engine.report_crying(80.0).unwrap();
        engine.acknowledge(emergency.id).unwrap();

        let stats = engine.stats();
        assert_eq!(stats.emergency, 0);
        assert_eq!(stats.warning, 1);
        assert_eq!(stats.total, 2);
    }
}
