use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::processing::level::DecibelScale;

/// Configuration for a metering session.
///
/// Immutable once handed to a [`LevelMeter`](crate::meter::level_meter::LevelMeter).
/// The chunk size is not part of the config: it is device-reported and
/// returned by [`AudioSource::open`](crate::traits::audio_source::AudioSource::open).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Target sample rate in Hz (default: 44100).
    pub sample_rate: u32,

    /// Number of capture channels. Only mono (1) is supported.
    pub channels: u16,

    /// Sample bit depth. Only 16-bit signed PCM is supported.
    pub bit_depth: u16,

    /// Inter-cycle wait between measurements (default: 100 ms).
    pub update_interval: Duration,

    /// Alert threshold in dB (default: 70.0).
    ///
    /// Consumed by the presentation layer when deciding whether a
    /// measurement [`exceeds`](crate::models::measurement::Measurement::exceeds)
    /// the noise limit; the meter itself never reads it.
    pub alert_threshold_db: f64,

    /// Calibration mapping from RMS amplitude to display decibels.
    pub scale: DecibelScale,
}

impl CaptureConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate == 0 {
            return Err("sample rate must be positive".into());
        }
        if self.channels != 1 {
            return Err(format!("unsupported channel count: {}", self.channels));
        }
        if self.bit_depth != 16 {
            return Err(format!("unsupported bit depth: {}", self.bit_depth));
        }
        if self.update_interval.is_zero() {
            return Err("update interval must be non-zero".into());
        }
        self.scale.validate()
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            channels: 1,
            bit_depth: 16,
            update_interval: Duration::from_millis(100),
            alert_threshold_db: 70.0,
            scale: DecibelScale::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(CaptureConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_sample_rate() {
        let config = CaptureConfig {
            sample_rate: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_stereo() {
        let config = CaptureConfig {
            channels: 2,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_24_bit() {
        let config = CaptureConfig {
            bit_depth: 24,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_interval() {
        let config = CaptureConfig {
            update_interval: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
