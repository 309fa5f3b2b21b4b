use crate::models::measurement::Measurement;
use crate::models::state::RecordingStatus;

/// Event sink for metering session notifications.
///
/// Both methods are called from the meter's worker thread, in strict cycle
/// order. Implementations must not block for unbounded time; a slow sink
/// stalls the measurement cadence. Marshal to a UI thread if needed.
pub trait MeterDelegate: Send + Sync {
    /// Called on every session lifecycle transition.
    fn on_status_changed(&self, status: &RecordingStatus);

    /// Called once per completed measurement cycle with the newest level.
    fn on_level_updated(&self, measurement: &Measurement);
}
