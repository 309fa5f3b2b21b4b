use serde::{Deserialize, Serialize};

/// One loudness reading, derived from a single chunk of samples.
///
/// Immutable snapshot; a new measurement supersedes the previous one
/// (at-most-one-pending, no history is kept).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Root-mean-square amplitude of the chunk, in raw sample units (≥ 0).
    pub rms: f64,

    /// Calibrated decibel value, clamped to the scale's display range.
    pub decibel: f64,

    /// Monotonic per-session counter, starting at 1.
    pub sequence: u64,
}

impl Measurement {
    /// Whether this reading crosses the caller's alert threshold.
    pub fn exceeds(&self, threshold_db: f64) -> bool {
        self.decibel > threshold_db
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exceeds_is_strict() {
        let m = Measurement {
            rms: 1000.0,
            decibel: 70.0,
            sequence: 1,
        };
        assert!(!m.exceeds(70.0));
        assert!(m.exceeds(69.9));
    }
}
