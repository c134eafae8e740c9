//! Telemetry for CradleWatch
//!
//! The simulated sensor pipeline: signal generation, clinical
//! classification, the two periodic producers, and the supervisor that
//! wires them to the shared alert engine.

pub mod audio;
pub mod classifier;
pub mod generator;
pub mod sampler;

pub use audio::{AudioAnomalyMonitor, IntensitySource, SimulatedMicrophone};
pub use generator::SignalGenerator;
pub use sampler::VitalsSampler;

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::info;

use crate::alerting::{run_dispatcher, AlertEngine, NotificationSender, Notifier};
use crate::config::Config;
use crate::models::{Alert, Reading};

/// The monitoring supervisor
///
/// Owns the alert engine and the two periodic producers. Stopping the
/// monitor stops the producers and the dispatcher; the alert ledger is left
/// intact.
pub struct Monitor {
    config: Config,
    engine: Arc<AlertEngine>,
    audio: Arc<AudioAnomalyMonitor>,
    readings_tx: watch::Sender<Reading>,
    dispatch_rx: Option<mpsc::Receiver<Alert>>,
    shutdown_tx: watch::Sender<bool>,
    producer_handles: Vec<JoinHandle<()>>,
    dispatcher_handle: Option<JoinHandle<()>>,
}

impl Monitor {
    /// Create a monitor from configuration
    pub fn new(config: Config) -> Self {
        let (dispatch_tx, dispatch_rx) = mpsc::channel(config.alerting.dispatch_buffer.max(1));

        let engine = Arc::new(
            AlertEngine::new(config.alerting.event_buffer, config.audio.crying_threshold)
                .with_dispatch(dispatch_tx),
        );
        let audio = Arc::new(AudioAnomalyMonitor::new(
            engine.clone(),
            config.audio.clone(),
        ));
        let (readings_tx, _) = watch::channel(Reading::baseline());
        let (shutdown_tx, _) = watch::channel(false);

        Self {
            config,
            engine,
            audio,
            readings_tx,
            dispatch_rx: Some(dispatch_rx),
            shutdown_tx,
            producer_handles: Vec::new(),
            dispatcher_handle: None,
        }
    }

    /// Start the producers and the notification dispatcher
    pub fn start(&mut self) {
        info!("Starting CradleWatch monitor");

        if let Some(rx) = self.dispatch_rx.take() {
            let notifier: Arc<dyn Notifier> = Arc::new(NotificationSender::new(
                self.config.alerting.webhook_url.clone(),
            ));
            let contacts = self.config.contacts.emergency.clone();
            self.dispatcher_handle = Some(tokio::spawn(run_dispatcher(notifier, contacts, rx)));
        }

        let sampler = VitalsSampler::new(
            self.engine.clone(),
            self.config.vitals.clone(),
            self.readings_tx.clone(),
        );
        self.producer_handles
            .push(tokio::spawn(sampler.run(self.shutdown_tx.subscribe())));

        let microphone = SimulatedMicrophone::new(None);
        self.producer_handles.push(tokio::spawn(
            self.audio
                .clone()
                .run(microphone, self.shutdown_tx.subscribe()),
        ));
    }

    /// Stop the producers and dispatcher, leaving the ledger intact
    pub async fn stop(&mut self) {
        let _ = self.shutdown_tx.send(true);

        for handle in self.producer_handles.drain(..) {
            let _ = handle.await;
        }
        if let Some(handle) = self.dispatcher_handle.take() {
            handle.abort();
        }

        info!("CradleWatch monitor stopped");
    }

    /// The shared alert engine
    pub fn engine(&self) -> Arc<AlertEngine> {
        self.engine.clone()
    }

    /// The audio anomaly monitor, for display state and the mic toggle
    pub fn audio(&self) -> Arc<AudioAnomalyMonitor> {
        self.audio.clone()
    }

    /// Subscribe to the latest published reading
    pub fn readings(&self) -> watch::Receiver<Reading> {
        self.readings_tx.subscribe()
    }
}
