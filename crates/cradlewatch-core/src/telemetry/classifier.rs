//! Clinical threshold classification
//!
//! Pure mapping from a reading to per-channel statuses. Bands are inclusive
//! on both ends, so a boundary value is Normal. Humidity is informational
//! and never classified.

use crate::models::{ChannelStatus, Reading, VitalStatuses};

/// Normal heart rate band in beats per minute
pub const HEART_RATE_NORMAL: (f64, f64) = (130.0, 170.0);
/// Normal temperature band in degrees Celsius
pub const TEMPERATURE_NORMAL: (f64, f64) = (36.2, 37.5);
/// Minimum normal oxygen saturation in percent; there is no high bound
pub const OXYGEN_MIN: f64 = 95.0;

/// Classify every alerting channel of a reading
pub fn classify(reading: &Reading) -> VitalStatuses {
    VitalStatuses {
        heart_rate: classify_band(reading.heart_rate, HEART_RATE_NORMAL),
        temperature: classify_band(reading.temperature, TEMPERATURE_NORMAL),
        oxygen: classify_oxygen(reading.oxygen_level),
    }
}

fn classify_band(value: f64, (low, high): (f64, f64)) -> ChannelStatus {
    if value < low {
        ChannelStatus::Low
    } else if value > high {
        ChannelStatus::High
    } else {
        ChannelStatus::Normal
    }
}

/// Oxygen saturation only alerts low; 100% is simply healthy
fn classify_oxygen(value: f64) -> ChannelStatus {
    if value < OXYGEN_MIN {
        ChannelStatus::Low
    } else {
        ChannelStatus::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rstest::rstest;

    use crate::models::Orientation;

    fn reading(heart_rate: f64, temperature: f64, oxygen_level: f64) -> Reading {
        Reading {
            timestamp: Utc::now(),
            heart_rate,
            temperature,
            humidity: 65.0,
            oxygen_level,
            orientation: Orientation {
                x: 0.0,
                y: 0.0,
                z: 9.8,
            },
        }
    }

    #[rstest]
    #[case(130.0)]
    #[case(170.0)]
    #[case(150.0)]
    fn heart_rate_band_is_inclusive(#[case] bpm: f64) {
        let statuses = classify(&reading(bpm, 36.8, 98.0));
        assert_eq!(statuses.heart_rate, ChannelStatus::Normal);
    }

    #[rstest]
    #[case(129.9, ChannelStatus::Low)]
    #[case(170.1, ChannelStatus::High)]
    fn heart_rate_outside_band_is_abnormal(#[case] bpm: f64, #[case] expected: ChannelStatus) {
        let statuses = classify(&reading(bpm, 36.8, 98.0));
        assert_eq!(statuses.heart_rate, expected);
    }

    #[rstest]
    #[case(36.2)]
    #[case(37.5)]
    fn temperature_boundaries_are_normal(#[case] temp: f64) {
        let statuses = classify(&reading(145.0, temp, 98.0));
        assert_eq!(statuses.temperature, ChannelStatus::Normal);
    }

    #[rstest]
    #[case(36.1, ChannelStatus::Low)]
    #[case(37.6, ChannelStatus::High)]
    fn temperature_outside_band_is_abnormal(#[case] temp: f64, #[case] expected: ChannelStatus) {
        let statuses = classify(&reading(145.0, temp, 98.0));
        assert_eq!(statuses.temperature, expected);
    }

    #[rstest]
    #[case(95.0, ChannelStatus::Normal)]
    #[case(100.0, ChannelStatus::Normal)]
    #[case(94.9, ChannelStatus::Low)]
    fn oxygen_only_alerts_low(#[case] level: f64, #[case] expected: ChannelStatus) {
        let statuses = classify(&reading(145.0, 36.8, level));
        assert_eq!(statuses.oxygen, expected);
    }

    #[test]
    fn humidity_never_classified() {
        let mut r = reading(145.0, 36.8, 98.0);
        r.humidity = 5.0;
        assert!(!classify(&r).any_abnormal());
    }
}
