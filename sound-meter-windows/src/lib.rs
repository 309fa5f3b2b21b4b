//! # sound-meter-windows
//!
//! Windows WASAPI backend for sound-meter-kit.
//!
//! Provides:
//! - `WasapiMicSource` — pull-based microphone capture via a WASAPI shared-mode endpoint
//! - `permissions` — Windows microphone privacy pre-flight check
//!
//! ## Platform Requirements
//! - Windows 10 1803+ (build 17134) for `AUDCLNT_STREAMFLAGS_AUTOCONVERTPCM`
//! - Visual Studio Build Tools 2022 + Windows SDK for linking
//!
//! ## Usage
//! ```ignore
//! use sound_meter_core::{CaptureConfig, LevelMeter};
//! use sound_meter_windows::WasapiMicSource;
//!
//! let source = WasapiMicSource::default_device();
//! let mut meter = LevelMeter::new(source, CaptureConfig::default());
//! meter.start().unwrap();
//! ```

#[cfg(target_os = "windows")]
pub mod permissions;
#[cfg(target_os = "windows")]
pub mod wasapi_mic;

#[cfg(target_os = "windows")]
pub use wasapi_mic::WasapiMicSource;
