//! Audio anomaly monitoring
//!
//! Emulates microphone sampling at its own cadence, independent of the
//! vital-sign loop. Crossing the crying threshold reports one event into
//! the alert engine; the `detected` flag it exposes to display consumers
//! auto-clears after a cool-down, which is purely cosmetic and separate
//! from alert dedup.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::watch;
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::alerting::AlertEngine;
use crate::config::AudioConfig;
use crate::models::AudioEvent;

/// Source of microphone intensity samples in [0, 100]
pub trait IntensitySource: Send {
    /// Take one intensity sample
    fn sample(&mut self) -> f64;
}

/// Simulated microphone: quiet ambient noise with occasional bursts
pub struct SimulatedMicrophone {
    rng: StdRng,
}

impl SimulatedMicrophone {
    /// Create a microphone, seeded when `seed` is set
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }
}

impl IntensitySource for SimulatedMicrophone {
    fn sample(&mut self) -> f64 {
        // 10% of samples are a burst anywhere on the scale, the rest are
        // ambient room noise.
        if self.rng.gen_bool(0.1) {
            self.rng.gen_range(0.0..=100.0)
        } else {
            self.rng.gen_range(0.0..=20.0)
        }
    }
}

struct AudioState {
    enabled: bool,
    last_detection: Option<Instant>,
    last_intensity: f64,
}

/// Parallel lower-rate monitor for the crying signal
pub struct AudioAnomalyMonitor {
    engine: Arc<AlertEngine>,
    config: AudioConfig,
    state: Mutex<AudioState>,
}

impl AudioAnomalyMonitor {
    /// Create a monitor feeding the given engine
    pub fn new(engine: Arc<AlertEngine>, config: AudioConfig) -> Self {
        let state = AudioState {
            enabled: config.enabled,
            last_detection: None,
            last_intensity: 0.0,
        };
        Self {
            engine,
            config,
            state: Mutex::new(state),
        }
    }

    /// Process one intensity sample
    ///
    /// Returns the emitted event when the intensity crosses the crying
    /// threshold; the alert engine applies its own dedup on top.
    pub fn observe(&self, intensity: f64) -> Option<AudioEvent> {
        let intensity = intensity.clamp(0.0, 100.0);

        {
            let mut state = self.state.lock();
            if !state.enabled {
                return None;
            }
            state.last_intensity = intensity;

            if intensity <= self.config.crying_threshold {
                return None;
            }
            state.last_detection = Some(Instant::now());
        }

        let event = AudioEvent {
            intensity,
            timestamp: Utc::now(),
        };

        if let Err(e) = self.engine.report_crying(intensity) {
            warn!(error = %e, "Failed to report crying event");
        }

        Some(event)
    }

    /// Whether a detection is still within the display cool-down window
    pub fn detected(&self) -> bool {
        let state = self.state.lock();
        state.enabled
            && state
                .last_detection
                .is_some_and(|at| at.elapsed() < self.config.detection_cooldown)
    }

    /// Intensity shown to display consumers; zero once the cool-down lapses
    pub fn display_intensity(&self) -> f64 {
        if self.detected() {
            self.state.lock().last_intensity
        } else {
            0.0
        }
    }

    /// Enable or disable the microphone
    ///
    /// Disabling clears the detection state immediately.
    pub fn set_enabled(&self, enabled: bool) {
        let mut state = self.state.lock();
        state.enabled = enabled;
        if !enabled {
            state.last_detection = None;
            state.last_intensity = 0.0;
        }
        info!(enabled, "Audio monitoring toggled");
    }

    /// Whether the microphone is currently enabled
    pub fn is_enabled(&self) -> bool {
        self.state.lock().enabled
    }

    /// Periodic sampling loop; exits on shutdown signal
    pub async fn run<S: IntensitySource>(
        self: Arc<Self>,
        mut source: S,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut ticker = interval(self.config.sample_interval);
        info!(
            interval_ms = self.config.sample_interval.as_millis() as u64,
            threshold = self.config.crying_threshold,
            "Audio anomaly monitor started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let intensity = source.sample();
                    if let Some(event) = self.observe(intensity) {
                        debug!(intensity = event.intensity, "Crying detected");
                    }
                }
                _ = shutdown.changed() => break,
            }
        }

        info!("Audio anomaly monitor stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::alerting::CRYING_SOURCE_KEY;

    fn monitor(config: AudioConfig) -> AudioAnomalyMonitor {
        let engine = Arc::new(AlertEngine::new(16, config.crying_threshold));
        AudioAnomalyMonitor::new(engine, config)
    }

    #[test]
    fn threshold_crossing_emits_event_and_alert() {
        let m = monitor(AudioConfig::default());

        let event = m.observe(85.0).expect("event above threshold");
        assert_eq!(event.intensity, 85.0);
        assert!(m.detected());

        let ledger = m.engine.snapshot();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].source_key, CRYING_SOURCE_KEY);
    }

    #[test]
    fn quiet_samples_emit_nothing() {
        let m = monitor(AudioConfig::default());
        assert!(m.observe(50.0).is_none());
        assert!(!m.detected());
        assert!(m.engine.snapshot().is_empty());
    }

    #[test]
    fn detected_flag_clears_after_cooldown() {
        let config = AudioConfig {
            detection_cooldown: Duration::ZERO,
            ..AudioConfig::default()
        };
        let m = monitor(config);

        m.observe(85.0);
        assert!(!m.detected());
        assert_eq!(m.display_intensity(), 0.0);
        // The alert outlives the cosmetic flag.
        assert_eq!(m.engine.snapshot().len(), 1);
    }

    #[test]
    fn disabled_microphone_ignores_samples() {
        let m = monitor(AudioConfig::default());
        m.set_enabled(false);

        assert!(m.observe(95.0).is_none());
        assert!(!m.detected());
        assert!(m.engine.snapshot().is_empty());

        m.set_enabled(true);
        assert!(m.observe(95.0).is_some());
    }

    #[test]
    fn simulated_microphone_stays_on_scale() {
        let mut mic = SimulatedMicrophone::new(Some(11));
        for _ in 0..1000 {
            let v = mic.sample();
            assert!((0.0..=100.0).contains(&v));
        }
    }
}
