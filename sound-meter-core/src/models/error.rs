use thiserror::Error;

/// Errors from [`AudioSource::open`](crate::traits::audio_source::AudioSource::open).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OpenError {
    /// Microphone access was not granted by the environment.
    #[error("microphone permission denied")]
    PermissionDenied,

    /// No capture device is present or the default endpoint is gone.
    #[error("no capture device available")]
    DeviceNotAvailable,

    /// The device rejected the requested configuration.
    #[error("unsupported capture configuration: {0}")]
    Unsupported(String),
}

/// Errors from [`AudioSource::start`](crate::traits::audio_source::AudioSource::start)
/// and [`LevelMeter::start`](crate::meter::level_meter::LevelMeter::start).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StartError {
    /// Another consumer holds the device.
    #[error("capture device busy")]
    DeviceBusy,

    /// `start` was called before a successful `open`.
    #[error("capture stream not initialized")]
    NotInitialized,

    /// The configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Backend failure outside the cases above.
    #[error("start failed: {0}")]
    Failed(String),
}

/// Errors from [`AudioSource::read_chunk`](crate::traits::audio_source::AudioSource::read_chunk).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReadError {
    /// Momentary underrun; the caller should skip the cycle and retry.
    #[error("transient capture underrun")]
    Transient,

    /// The device handle has become invalid; the session cannot continue.
    #[error("capture device failed: {0}")]
    Fatal(String),
}
