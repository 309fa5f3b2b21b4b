use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

use crate::models::config::CaptureConfig;
use crate::models::error::{ReadError, StartError};
use crate::models::measurement::Measurement;
use crate::models::state::RecordingStatus;
use crate::processing::level;
use crate::traits::audio_source::AudioSource;
use crate::traits::meter_delegate::MeterDelegate;

/// Latest-wins snapshot shared between the worker and consumers.
struct MeterShared {
    status: RecordingStatus,
    last_measurement: Option<Measurement>,
}

impl MeterShared {
    fn new() -> Self {
        Self {
            status: RecordingStatus::Initializing,
            last_measurement: None,
        }
    }
}

/// Sound level meter: owns the acquisition loop over an [`AudioSource`].
///
/// Generic over the capture backend. The whole device lifecycle (open,
/// start, chunk reads, stop, release) runs on one dedicated worker thread,
/// because `read_chunk` blocks; the native handle never crosses threads.
///
/// Data flow:
/// ```text
/// [AudioSource] → read_chunk → RMS → DecibelScale → Measurement
///                                         ↓
///               snapshot (status / last level) + MeterDelegate events
/// ```
///
/// Consumers either poll [`status`](Self::status) /
/// [`last_measurement`](Self::last_measurement) or subscribe via
/// [`set_delegate`](Self::set_delegate); a new measurement supersedes the
/// previous one, unconsumed readings are not queued.
pub struct LevelMeter<S: AudioSource + 'static> {
    source: Option<S>,
    config: CaptureConfig,
    shared: Arc<Mutex<MeterShared>>,
    delegate: Option<Arc<dyn MeterDelegate>>,
    running: Arc<AtomicBool>,
    worker: Option<thread::JoinHandle<()>>,
}

impl<S: AudioSource + 'static> LevelMeter<S> {
    pub fn new(source: S, config: CaptureConfig) -> Self {
        Self {
            source: Some(source),
            config,
            shared: Arc::new(Mutex::new(MeterShared::new())),
            delegate: None,
            running: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn MeterDelegate>) {
        self.delegate = Some(delegate);
    }

    /// Current session status (read-only copy).
    pub fn status(&self) -> RecordingStatus {
        self.shared.lock().status.clone()
    }

    /// The most recent measurement, if any has been published.
    pub fn last_measurement(&self) -> Option<Measurement> {
        self.shared.lock().last_measurement
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Spawn the worker and begin the metering session.
    ///
    /// The session runs until [`stop`](Self::stop) is called or a fatal
    /// device error occurs; each meter drives at most one session.
    pub fn start(&mut self) -> Result<(), StartError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(StartError::DeviceBusy);
        }
        self.config
            .validate()
            .map_err(StartError::InvalidConfig)?;
        let source = self.source.take().ok_or(StartError::NotInitialized)?;

        self.running.store(true, Ordering::SeqCst);

        let config = self.config.clone();
        let shared = Arc::clone(&self.shared);
        let delegate = self.delegate.clone();
        let running = Arc::clone(&self.running);

        let handle = thread::Builder::new()
            .name("level-meter".into())
            .spawn(move || {
                Self::run_session(source, config, shared, delegate, running);
            })
            .map_err(|e| {
                self.running.store(false, Ordering::SeqCst);
                StartError::Failed(format!("failed to spawn worker thread: {}", e))
            })?;

        self.worker = Some(handle);
        Ok(())
    }

    /// Signal cooperative cancellation and wait for the worker to finish.
    ///
    /// Idempotent. The cancellation is observed at the worker's next
    /// suspension point (bounded by the read timeout plus the inter-cycle
    /// wait), after which the source is stopped and released and a terminal
    /// status is published.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }

    // --- Worker ---

    /// Full session lifecycle on the worker thread.
    ///
    /// `stop` + `release` run exactly once, on every exit path, before the
    /// terminal status is published.
    fn run_session(
        mut source: S,
        config: CaptureConfig,
        shared: Arc<Mutex<MeterShared>>,
        delegate: Option<Arc<dyn MeterDelegate>>,
        running: Arc<AtomicBool>,
    ) {
        Self::publish_status(&shared, &delegate, RecordingStatus::Initializing);

        let outcome = Self::drive(&mut source, &config, &shared, &delegate, &running);

        source.stop();
        source.release();

        match outcome {
            Ok(()) => {
                log::debug!("metering session stopped");
                Self::publish_status(&shared, &delegate, RecordingStatus::Stopped);
            }
            Err(reason) => {
                log::error!("metering session failed: {}", reason);
                Self::publish_status(&shared, &delegate, RecordingStatus::Error(reason));
            }
        }
        running.store(false, Ordering::SeqCst);
    }

    /// Open, start, and run the measurement loop until cancellation.
    ///
    /// Returns `Ok(())` on cooperative cancellation, `Err(reason)` on any
    /// unrecoverable failure. Resource cleanup is the caller's job so it
    /// happens exactly once regardless of where this returns.
    fn drive(
        source: &mut S,
        config: &CaptureConfig,
        shared: &Mutex<MeterShared>,
        delegate: &Option<Arc<dyn MeterDelegate>>,
        running: &AtomicBool,
    ) -> Result<(), String> {
        if !source.is_available() {
            return Err("no capture device available".into());
        }

        let chunk_len = source.open(config).map_err(|e| e.to_string())?;
        if chunk_len == 0 {
            return Err("device reported a zero-length chunk".into());
        }
        log::debug!("capture stream open, chunk size {} samples", chunk_len);
        Self::publish_status(shared, delegate, RecordingStatus::StreamReady);

        source.start().map_err(|e| e.to_string())?;
        Self::publish_status(shared, delegate, RecordingStatus::Recording);

        let mut buf = vec![0i16; chunk_len];
        let mut sequence: u64 = 0;
        let mut reads: u64 = 0;

        while running.load(Ordering::SeqCst) {
            match source.read_chunk(&mut buf) {
                Ok(0) => log::warn!("empty chunk from device, skipping cycle"),
                Ok(n) => {
                    reads += 1;
                    let rms = level::rms(&buf[..n]);
                    let decibel = config.scale.decibel(rms);
                    sequence += 1;
                    if reads % 10 == 0 {
                        log::debug!("read #{}: rms={:.1} db={:.1}", reads, rms, decibel);
                    }
                    Self::publish_level(
                        shared,
                        delegate,
                        Measurement {
                            rms,
                            decibel,
                            sequence,
                        },
                    );
                }
                Err(ReadError::Transient) => {
                    log::debug!("transient underrun, skipping cycle");
                }
                Err(err @ ReadError::Fatal(_)) => return Err(err.to_string()),
            }

            // Fixed inter-cycle wait, then re-check the cancellation flag.
            thread::sleep(config.update_interval);
        }

        Ok(())
    }

    fn publish_status(
        shared: &Mutex<MeterShared>,
        delegate: &Option<Arc<dyn MeterDelegate>>,
        status: RecordingStatus,
    ) {
        shared.lock().status = status.clone();
        if let Some(ref d) = delegate {
            d.on_status_changed(&status);
        }
    }

    fn publish_level(
        shared: &Mutex<MeterShared>,
        delegate: &Option<Arc<dyn MeterDelegate>>,
        measurement: Measurement,
    ) {
        shared.lock().last_measurement = Some(measurement);
        if let Some(ref d) = delegate {
            d.on_level_updated(&measurement);
        }
    }
}

impl<S: AudioSource + 'static> Drop for LevelMeter<S> {
    fn drop(&mut self) {
        self.stop();
    }
}
