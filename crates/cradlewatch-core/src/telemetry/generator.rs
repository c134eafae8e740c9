//! Bounded random-walk signal generation
//!
//! Produces successive sensor readings by perturbing the previous reading
//! with a uniform per-channel delta and clamping to the physical range.
//! The generator knows nothing about alerting.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::{Orientation, Reading};

/// Physical plausible range per channel; readings never leave these
pub const HEART_RATE_RANGE: (f64, f64) = (120.0, 180.0);
/// Temperature range in degrees Celsius
pub const TEMPERATURE_RANGE: (f64, f64) = (35.5, 38.5);
/// Relative humidity range in percent
pub const HUMIDITY_RANGE: (f64, f64) = (40.0, 80.0);
/// Oxygen saturation range in percent
pub const OXYGEN_RANGE: (f64, f64) = (92.0, 100.0);

const HEART_RATE_STEP: f64 = 5.0;
const TEMPERATURE_STEP: f64 = 0.15;
const HUMIDITY_STEP: f64 = 2.5;
const OXYGEN_STEP: f64 = 1.0;

/// Random-walk generator over simulated incubator sensors
///
/// Deterministic given a seed, which is what makes the classifier and
/// dedup logic downstream reproducible in tests.
pub struct SignalGenerator {
    rng: StdRng,
}

impl SignalGenerator {
    /// Create a generator, seeded when `seed` is set
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// Produce the next reading from the previous one
    ///
    /// Cannot fail; every channel is clamped to its physical range.
    pub fn tick(&mut self, prev: &Reading) -> Reading {
        Reading {
            timestamp: Utc::now(),
            heart_rate: self.walk(prev.heart_rate, HEART_RATE_STEP, HEART_RATE_RANGE),
            temperature: self.walk(prev.temperature, TEMPERATURE_STEP, TEMPERATURE_RANGE),
            humidity: self.walk(prev.humidity, HUMIDITY_STEP, HUMIDITY_RANGE),
            oxygen_level: self.walk(prev.oxygen_level, OXYGEN_STEP, OXYGEN_RANGE),
            orientation: self.orientation(),
        }
    }

    fn walk(&mut self, value: f64, step: f64, (min, max): (f64, f64)) -> f64 {
        (value + self.rng.gen_range(-step..=step)).clamp(min, max)
    }

    /// Orientation is jitter around rest, not a walk: x/y settle back
    /// toward level and z stays near gravity.
    fn orientation(&mut self) -> Orientation {
        Orientation {
            x: self.rng.gen_range(-1.0..=1.0),
            y: self.rng.gen_range(-1.0..=1.0),
            z: 9.8 + self.rng.gen_range(-0.25..=0.25),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_seeds_produce_equal_walks() {
        let mut a = SignalGenerator::new(Some(42));
        let mut b = SignalGenerator::new(Some(42));

        let mut reading_a = Reading::baseline();
        let mut reading_b = Reading::baseline();
        reading_b.timestamp = reading_a.timestamp;

        for _ in 0..50 {
            reading_a = a.tick(&reading_a);
            reading_b = b.tick(&reading_b);
            assert_eq!(reading_a.heart_rate, reading_b.heart_rate);
            assert_eq!(reading_a.temperature, reading_b.temperature);
            assert_eq!(reading_a.humidity, reading_b.humidity);
            assert_eq!(reading_a.oxygen_level, reading_b.oxygen_level);
            assert_eq!(reading_a.orientation, reading_b.orientation);
        }
    }

    #[test]
    fn readings_stay_in_physical_range() {
        let mut gen = SignalGenerator::new(Some(7));
        let mut reading = Reading::baseline();

        for _ in 0..1000 {
            reading = gen.tick(&reading);
            assert!(reading.heart_rate >= HEART_RATE_RANGE.0);
            assert!(reading.heart_rate <= HEART_RATE_RANGE.1);
            assert!(reading.temperature >= TEMPERATURE_RANGE.0);
            assert!(reading.temperature <= TEMPERATURE_RANGE.1);
            assert!(reading.humidity >= HUMIDITY_RANGE.0);
            assert!(reading.humidity <= HUMIDITY_RANGE.1);
            assert!(reading.oxygen_level >= OXYGEN_RANGE.0);
            assert!(reading.oxygen_level <= OXYGEN_RANGE.1);
            assert!(reading.orientation.z >= 9.55 && reading.orientation.z <= 10.05);
        }
    }

    #[test]
    fn out_of_range_input_is_pulled_back() {
        let mut gen = SignalGenerator::new(Some(3));
        let mut reading = Reading::baseline();
        reading.heart_rate = 500.0;

        let next = gen.tick(&reading);
        assert!(next.heart_rate <= HEART_RATE_RANGE.1);
    }
}
