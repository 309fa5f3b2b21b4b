//! WASAPI microphone source.
//!
//! Captures audio from the default WASAPI capture endpoint (microphone) in
//! shared mode and serves it as 16-bit mono chunks through the
//! `AudioSource` pull interface.

use std::thread;
use std::time::{Duration, Instant};

use windows::core::PCWSTR;
use windows::Win32::Foundation::E_ACCESSDENIED;
use windows::Win32::Media::Audio::*;
use windows::Win32::System::Com::*;
use windows::Win32::System::Threading::*;

use sound_meter_core::models::config::CaptureConfig;
use sound_meter_core::models::error::{OpenError, ReadError, StartError};
use sound_meter_core::processing::ring_buffer::RingBuffer;
use sound_meter_core::traits::audio_source::AudioSource;

/// PCM format tag for `WAVEFORMATEX` (mmreg.h `WAVE_FORMAT_PCM`).
const FORMAT_TAG_PCM: u16 = 1;

/// Poll interval while waiting for the device to produce a packet.
const PACKET_POLL: Duration = Duration::from_millis(10);

/// How long `read_chunk` waits for data before reporting an underrun.
const READ_TIMEOUT: Duration = Duration::from_millis(250);

/// WASAPI capture endpoint exposed as a pull-based [`AudioSource`].
///
/// The device is asked for the configured PCM16 mono format directly
/// (`AUDCLNT_STREAMFLAGS_AUTOCONVERTPCM`), so no sample conversion happens
/// on this side; variable-size capture packets are staged in a ring buffer
/// and handed out in fixed-size chunks.
///
/// Lifecycle: `open` → `start` → `read_chunk`* → `stop` → `release`, all on
/// the thread that drives the meter loop. COM is initialized in `open` and
/// torn down in `release` on that same thread.
pub struct WasapiMicSource {
    audio_client: Option<IAudioClient>,
    capture_client: Option<IAudioCaptureClient>,
    staging: RingBuffer,
    com_initialized: bool,
    started: bool,
}

// SAFETY: the COM interfaces are created in `open` and only ever touched on
// the single thread that calls open/start/read_chunk/stop/release (the
// meter's worker). The struct crosses threads only before `open`.
unsafe impl Send for WasapiMicSource {}

impl WasapiMicSource {
    /// Source over the system default microphone.
    pub fn default_device() -> Self {
        Self {
            audio_client: None,
            capture_client: None,
            staging: RingBuffer::new(1), // placeholder, resized on open
            com_initialized: false,
            started: false,
        }
    }

    /// Drain every pending capture packet into the staging buffer.
    fn drain_packets(&mut self) -> Result<(), ReadError> {
        let capture = match self.capture_client.as_ref() {
            Some(c) => c,
            None => return Err(ReadError::Fatal("capture stream not open".into())),
        };

        unsafe {
            let mut packet_len = capture.GetNextPacketSize().map_err(read_failure)?;

            while packet_len > 0 {
                let mut buffer_ptr: *mut u8 = std::ptr::null_mut();
                let mut num_frames: u32 = 0;
                let mut flags: u32 = 0;

                capture
                    .GetBuffer(&mut buffer_ptr, &mut num_frames, &mut flags, None, None)
                    .map_err(read_failure)?;

                if num_frames > 0 && !buffer_ptr.is_null() {
                    // Mono PCM16: one sample per frame.
                    let total_samples = num_frames as usize;

                    if flags & (AUDCLNT_BUFFERFLAGS_SILENT.0 as u32) != 0 {
                        self.staging.write(&vec![0i16; total_samples]);
                    } else {
                        let samples = std::slice::from_raw_parts(
                            buffer_ptr as *const i16,
                            total_samples,
                        );
                        self.staging.write(samples);
                    }
                }

                capture.ReleaseBuffer(num_frames).map_err(read_failure)?;
                packet_len = capture.GetNextPacketSize().map_err(read_failure)?;
            }
        }

        Ok(())
    }
}

impl AudioSource for WasapiMicSource {
    fn is_available(&self) -> bool {
        unsafe {
            if CoInitializeEx(None, COINIT_MULTITHREADED).ok().is_err() {
                return false;
            }

            let enumerator: Result<IMMDeviceEnumerator, windows::core::Error> =
                CoCreateInstance(&MMDeviceEnumerator, None, CLSCTX_ALL);
            let available = match enumerator {
                Ok(e) => e.GetDefaultAudioEndpoint(eCapture, eConsole).is_ok(),
                Err(_) => false,
            };

            CoUninitialize();
            available
        }
    }

    fn open(&mut self, config: &CaptureConfig) -> Result<usize, OpenError> {
        unsafe {
            CoInitializeEx(None, COINIT_MULTITHREADED)
                .ok()
                .map_err(|e| OpenError::Unsupported(format!("CoInitializeEx failed: {}", e)))?;
            self.com_initialized = true;

            let enumerator: IMMDeviceEnumerator =
                CoCreateInstance(&MMDeviceEnumerator, None, CLSCTX_ALL)
                    .map_err(|_| OpenError::DeviceNotAvailable)?;

            let device = enumerator
                .GetDefaultAudioEndpoint(eCapture, eConsole)
                .map_err(|_| OpenError::DeviceNotAvailable)?;

            let audio_client: IAudioClient = device.Activate(CLSCTX_ALL, None).map_err(|e| {
                if e.code() == E_ACCESSDENIED {
                    OpenError::PermissionDenied
                } else {
                    OpenError::Unsupported(format!("IAudioClient activation failed: {}", e))
                }
            })?;

            let block_align = config.channels * config.bit_depth / 8;
            let format = WAVEFORMATEX {
                wFormatTag: FORMAT_TAG_PCM,
                nChannels: config.channels,
                nSamplesPerSec: config.sample_rate,
                nAvgBytesPerSec: config.sample_rate * block_align as u32,
                nBlockAlign: block_align,
                wBitsPerSample: config.bit_depth,
                cbSize: 0,
            };

            // Device buffer: 100 ms, in 100-nanosecond units.
            let buffer_duration: i64 = 1_000_000;

            audio_client
                .Initialize(
                    AUDCLNT_SHAREMODE_SHARED,
                    AUDCLNT_STREAMFLAGS_AUTOCONVERTPCM
                        | AUDCLNT_STREAMFLAGS_SRC_DEFAULT_QUALITY
                        | AUDCLNT_STREAMFLAGS_NOPERSIST,
                    buffer_duration,
                    0,
                    &format,
                    None,
                )
                .map_err(|e| {
                    let code = e.code();
                    if code == E_ACCESSDENIED {
                        OpenError::PermissionDenied
                    } else if code == AUDCLNT_E_UNSUPPORTED_FORMAT {
                        OpenError::Unsupported(format!(
                            "device rejected {} Hz / {}-bit / {} channel capture",
                            config.sample_rate, config.bit_depth, config.channels
                        ))
                    } else {
                        OpenError::Unsupported(format!("IAudioClient::Initialize failed: {}", e))
                    }
                })?;

            let chunk_len = audio_client
                .GetBufferSize()
                .map_err(|e| OpenError::Unsupported(format!("GetBufferSize failed: {}", e)))?
                as usize;
            if chunk_len == 0 {
                return Err(OpenError::Unsupported("device reported an empty buffer".into()));
            }

            let capture_client: IAudioCaptureClient = audio_client
                .GetService()
                .map_err(|e| OpenError::Unsupported(format!("GetService failed: {}", e)))?;

            self.staging = RingBuffer::new(chunk_len * 4);
            self.audio_client = Some(audio_client);
            self.capture_client = Some(capture_client);

            log::debug!(
                "WASAPI capture open: {} Hz mono, chunk {} samples",
                config.sample_rate,
                chunk_len
            );
            Ok(chunk_len)
        }
    }

    fn start(&mut self) -> Result<(), StartError> {
        let client = match self.audio_client.as_ref() {
            Some(c) => c,
            None => return Err(StartError::NotInitialized),
        };
        if self.started {
            return Ok(());
        }

        unsafe {
            // Register the capture thread with MMCSS for real-time priority.
            let mut task_index: u32 = 0;
            let task_name: Vec<u16> = "Pro Audio\0".encode_utf16().collect();
            let _mmcss_handle =
                AvSetMmThreadCharacteristicsW(PCWSTR(task_name.as_ptr()), &mut task_index);

            client.Start().map_err(|e| {
                if e.code() == AUDCLNT_E_DEVICE_IN_USE {
                    StartError::DeviceBusy
                } else {
                    StartError::Failed(format!("IAudioClient::Start failed: {}", e))
                }
            })?;
        }

        self.started = true;
        Ok(())
    }

    fn read_chunk(&mut self, out: &mut [i16]) -> Result<usize, ReadError> {
        let deadline = Instant::now() + READ_TIMEOUT;

        loop {
            self.drain_packets()?;

            if !self.staging.is_empty() {
                return Ok(self.staging.read_into(out));
            }
            if Instant::now() >= deadline {
                return Err(ReadError::Transient);
            }
            thread::sleep(PACKET_POLL);
        }
    }

    fn stop(&mut self) {
        if self.started {
            if let Some(ref client) = self.audio_client {
                unsafe {
                    let _ = client.Stop();
                }
            }
            self.started = false;
        }
    }

    fn release(&mut self) {
        self.stop();
        self.capture_client = None;
        self.audio_client = None;
        self.staging.reset();
        if self.com_initialized {
            unsafe {
                CoUninitialize();
            }
            self.com_initialized = false;
        }
    }
}

impl Drop for WasapiMicSource {
    fn drop(&mut self) {
        self.release();
    }
}

fn read_failure(e: windows::core::Error) -> ReadError {
    if e.code() == AUDCLNT_E_DEVICE_INVALIDATED {
        ReadError::Fatal("capture device invalidated".into())
    } else {
        ReadError::Fatal(format!("capture read failed: {}", e))
    }
}
