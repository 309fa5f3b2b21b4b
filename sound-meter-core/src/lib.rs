//! # sound-meter-core
//!
//! Platform-agnostic sound level metering core library.
//!
//! Samples microphone input in fixed-size chunks, computes RMS energy,
//! maps it to a calibrated 0–100 dB display value, and publishes
//! `(status, level)` events at a steady cadence. Platform-specific backends
//! (Windows WASAPI) implement the `AudioSource` trait and plug into the
//! generic `LevelMeter`.
//!
//! ## Architecture
//!
//! ```text
//! sound-meter-core (this crate)
//! ├── traits/       ← AudioSource, MeterDelegate
//! ├── models/       ← CaptureConfig, RecordingStatus, Measurement, errors
//! ├── processing/   ← RMS / decibel math, sample ring buffer
//! └── meter/        ← LevelMeter (acquisition/measurement loop)
//! ```
//!
//! Rendering, alert styling, and permission prompts are consumers of the
//! event stream, not part of this crate.

pub mod meter;
pub mod models;
pub mod processing;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use meter::level_meter::LevelMeter;
pub use models::config::CaptureConfig;
pub use models::error::{OpenError, ReadError, StartError};
pub use models::measurement::Measurement;
pub use models::state::RecordingStatus;
pub use processing::level::DecibelScale;
pub use processing::ring_buffer::RingBuffer;
pub use traits::audio_source::AudioSource;
pub use traits::meter_delegate::MeterDelegate;
