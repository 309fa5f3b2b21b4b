//! RMS and decibel math for 16-bit mono chunks.

use serde::{Deserialize, Serialize};

/// Calibration mapping from raw RMS amplitude to display decibels.
///
/// The defaults place typical room noise in a human-meaningful 0–100 range:
/// full-scale 16-bit amplitude as the log reference, a +90 dB offset on the
/// resulting dBFS value, and a hard clamp to the display range. The
/// constants are heuristic, not derived from an acoustic standard.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecibelScale {
    /// Reference amplitude for the log ratio (default: 32767.0, i16 full scale).
    pub reference: f64,

    /// Calibration offset added to the dBFS value (default: 90.0).
    pub offset_db: f64,

    /// Lower display bound; also the value reported for silent chunks.
    pub floor_db: f64,

    /// Upper display bound.
    pub ceiling_db: f64,
}

impl DecibelScale {
    pub fn validate(&self) -> Result<(), String> {
        if self.reference <= 0.0 {
            return Err("scale reference must be positive".into());
        }
        if self.floor_db >= self.ceiling_db {
            return Err("scale floor must be below ceiling".into());
        }
        Ok(())
    }

    /// Map an RMS amplitude to the clamped display decibel value.
    ///
    /// Silence (`rms <= 0`) maps to the floor, not to negative infinity.
    pub fn decibel(&self, rms: f64) -> f64 {
        if rms <= 0.0 {
            return self.floor_db;
        }
        let db = 20.0 * (rms / self.reference).log10() + self.offset_db;
        db.clamp(self.floor_db, self.ceiling_db)
    }
}

impl Default for DecibelScale {
    fn default() -> Self {
        Self {
            reference: 32767.0,
            offset_db: 90.0,
            floor_db: 0.0,
            ceiling_db: 100.0,
        }
    }
}

/// Root-mean-square amplitude over a chunk of signed 16-bit samples.
///
/// Accumulates in f64: squared samples reach ~2^30 and a chunk can hold
/// tens of thousands of them, which overflows 32-bit accumulation.
pub fn rms(samples: &[i16]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = samples.iter().map(|&s| {
        let v = s as f64;
        v * v
    }).sum();
    (sum_sq / samples.len() as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn rms_of_silence_is_zero() {
        assert_eq!(rms(&[0; 256]), 0.0);
        assert_eq!(rms(&[]), 0.0);
    }

    #[test]
    fn rms_is_non_negative_for_negative_samples() {
        let chunk = [-1000i16, -2000, -3000];
        assert!(rms(&chunk) > 0.0);
    }

    #[test]
    fn rms_of_constant_amplitude_equals_amplitude() {
        let chunk = [1000i16; 512];
        assert_relative_eq!(rms(&chunk), 1000.0, max_relative = 1e-9);
    }

    #[test]
    fn rms_of_sine_is_peak_over_sqrt2() {
        let peak = 12000.0f64;
        let n = 4410; // ten full periods at 441 Hz / 44.1 kHz
        let chunk: Vec<i16> = (0..n)
            .map(|i| {
                let phase = 2.0 * std::f64::consts::PI * 441.0 * i as f64 / 44100.0;
                (peak * phase.sin()).round() as i16
            })
            .collect();

        assert_relative_eq!(rms(&chunk), peak / 2.0f64.sqrt(), max_relative = 1e-3);
    }

    #[test]
    fn rms_handles_extreme_amplitudes_without_overflow() {
        let chunk = [i16::MIN; 44100];
        assert_relative_eq!(rms(&chunk), 32768.0, max_relative = 1e-9);
    }

    #[test]
    fn decibel_of_zero_rms_is_exactly_floor() {
        let scale = DecibelScale::default();
        assert_eq!(scale.decibel(0.0), 0.0);
    }

    #[test]
    fn decibel_is_monotonic_in_rms() {
        let scale = DecibelScale::default();
        let mut last = scale.decibel(0.5);
        for rms in [1.0, 10.0, 100.0, 1000.0, 10000.0, 32767.0] {
            let db = scale.decibel(rms);
            assert!(db >= last, "decibel not monotonic at rms={}", rms);
            last = db;
        }
    }

    #[test]
    fn full_scale_chunk_clamps_to_ceiling() {
        let scale = DecibelScale::default();
        let chunk = [i16::MAX; 1024];
        // 20·log10(1) + 90 = 90, inside range; force past the ceiling too.
        assert_relative_eq!(scale.decibel(rms(&chunk)), 90.0, max_relative = 1e-9);
        assert_eq!(scale.decibel(1_000_000.0), 100.0);
    }

    #[test]
    fn quiet_chunk_clamps_to_floor() {
        let scale = DecibelScale::default();
        // rms = 1 → 20·log10(1/32767) + 90 ≈ -0.3, clamped up to 0.
        assert_eq!(scale.decibel(1.0), 0.0);
    }

    #[test]
    fn display_range_holds_across_amplitudes() {
        let scale = DecibelScale::default();
        for rms in [0.0, 0.001, 1.0, 327.67, 32767.0, 1e9] {
            let db = scale.decibel(rms);
            assert!((0.0..=100.0).contains(&db), "out of range at rms={}", rms);
        }
    }

    #[test]
    fn custom_calibration_shifts_mapping() {
        let scale = DecibelScale {
            offset_db: 94.0,
            ..DecibelScale::default()
        };
        assert_relative_eq!(scale.decibel(32767.0), 94.0, max_relative = 1e-9);
    }

    #[test]
    fn scale_validation() {
        assert!(DecibelScale::default().validate().is_ok());

        let bad_ref = DecibelScale {
            reference: 0.0,
            ..DecibelScale::default()
        };
        assert!(bad_ref.validate().is_err());

        let inverted = DecibelScale {
            floor_db: 100.0,
            ceiling_db: 0.0,
            ..DecibelScale::default()
        };
        assert!(inverted.validate().is_err());
    }
}
