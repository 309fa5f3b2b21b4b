use crate::models::config::CaptureConfig;
use crate::models::error::{OpenError, ReadError, StartError};

/// Interface for platform-specific microphone capture backends.
///
/// Implemented by:
/// - `WasapiMicSource` (Windows)
/// - in-memory scripted sources in tests
///
/// A source moves through `open` → `start` → repeated `read_chunk` →
/// `stop` → `release`, driven entirely from the meter's worker thread; the
/// native capture handle never crosses threads.
pub trait AudioSource: Send {
    /// Whether a capture device is currently present.
    fn is_available(&self) -> bool;

    /// Allocate and configure the capture stream.
    ///
    /// Returns the chunk size in samples: the device-reported minimum
    /// transfer unit for the requested rate/format, always > 0. The caller
    /// sizes its reusable read buffer from this value.
    fn open(&mut self, config: &CaptureConfig) -> Result<usize, OpenError>;

    /// Begin active capture. Requires a successful `open`.
    fn start(&mut self) -> Result<(), StartError>;

    /// Block until samples are available (bounded by an internal timeout)
    /// and copy them into `out`.
    ///
    /// Returns the number of samples written, `0 ≤ n ≤ out.len()`.
    /// `ReadError::Transient` signals a momentary underrun (skip the cycle
    /// and call again); `ReadError::Fatal` means the handle is invalid and
    /// the session must end.
    fn read_chunk(&mut self, out: &mut [i16]) -> Result<usize, ReadError>;

    /// Halt capture. Idempotent; safe to call in any state.
    fn stop(&mut self);

    /// Free the native capture handle. Idempotent; safe to call in any
    /// state, including after a failed `open`.
    fn release(&mut self);
}
