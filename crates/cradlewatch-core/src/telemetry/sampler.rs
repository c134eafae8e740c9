//! Vital-sign sampling producer
//!
//! Glues the signal generator to the classifier and the alert engine on the
//! vitals cadence, and publishes each reading for display consumers. One
//! failed iteration is logged and retried on the next tick; the loop itself
//! never dies.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::interval;
use tracing::{debug, info};

use crate::alerting::AlertEngine;
use crate::config::VitalsConfig;
use crate::models::{Alert, Reading};
use crate::telemetry::classifier;
use crate::telemetry::generator::SignalGenerator;

/// Periodic producer driving generator → classifier → engine
pub struct VitalsSampler {
    engine: Arc<AlertEngine>,
    generator: SignalGenerator,
    reading: Reading,
    config: VitalsConfig,
    readings_tx: watch::Sender<Reading>,
}

impl VitalsSampler {
    /// Create a sampler starting from the baseline reading
    pub fn new(
        engine: Arc<AlertEngine>,
        config: VitalsConfig,
        readings_tx: watch::Sender<Reading>,
    ) -> Self {
        let generator = SignalGenerator::new(config.seed);
        Self {
            engine,
            generator,
            reading: Reading::baseline(),
            config,
            readings_tx,
        }
    }

    /// One generate-classify-evaluate step
    pub fn step(&mut self) -> (Reading, Vec<Alert>) {
        self.reading = self.generator.tick(&self.reading);
        let statuses = classifier::classify(&self.reading);
        let raised = self.engine.observe(&statuses);

        let _ = self.readings_tx.send(self.reading.clone());
        (self.reading.clone(), raised)
    }

    /// Periodic sampling loop; exits on shutdown signal
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval(self.config.sample_interval);
        info!(
            interval_ms = self.config.sample_interval.as_millis() as u64,
            seed = ?self.config.seed,
            "Vitals sampler started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let (reading, raised) = self.step();
                    debug!(
                        heart_rate = reading.heart_rate,
                        temperature = reading.temperature,
                        oxygen = reading.oxygen_level,
                        raised = raised.len(),
                        "Sampled vitals"
                    );
                }
                _ = shutdown.changed() => break,
            }
        }

        info!("Vitals sampler stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sampler(seed: u64) -> VitalsSampler {
        let engine = Arc::new(AlertEngine::new(16, 70.0));
        let config = VitalsConfig {
            seed: Some(seed),
            ..VitalsConfig::default()
        };
        let (tx, _rx) = watch::channel(Reading::baseline());
        VitalsSampler::new(engine, config, tx)
    }

    #[test]
    fn step_publishes_each_reading() {
        let mut s = sampler(42);
        let (tx, rx) = watch::channel(Reading::baseline());
        s.readings_tx = tx;

        let (reading, _) = s.step();
        assert_eq!(*rx.borrow(), reading);

        let (next, _) = s.step();
        assert_eq!(*rx.borrow(), next);
    }

    #[test]
    fn raised_alerts_match_classified_conditions() {
        let mut s = sampler(42);

        for _ in 0..500 {
            let (reading, raised) = s.step();
            let statuses = classifier::classify(&reading);
            for alert in &raised {
                // Every raise corresponds to a currently abnormal channel.
                assert!(statuses.any_abnormal(), "raised {} on normal vitals", alert.source_key);
            }
        }

        // Dedup holds across the whole walk: at most one open alert per key.
        let ledger = s.engine.snapshot();
        let mut keys: Vec<_> = ledger.iter().map(|a| a.source_key.clone()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), ledger.len());
    }
}
