//! Windows microphone privacy permission check.
//!
//! On Windows 10 1803+, microphone access is controlled by the privacy
//! settings at Settings > Privacy > Microphone. Desktop apps are generally
//! allowed unless the user has disabled the global toggle, in which case
//! activating a capture client fails with access denied.

use windows::Win32::Foundation::E_ACCESSDENIED;
use windows::Win32::Media::Audio::*;
use windows::Win32::System::Com::*;

use sound_meter_core::models::error::OpenError;

/// Check if microphone access is available.
///
/// Probe-activates the default capture endpoint. `Ok(false)` means either
/// no capture device exists or the privacy toggle denies access; in both
/// cases a subsequent `open` would fail. Intended as a pre-flight check so
/// the caller can prompt the user before starting a session.
pub fn check_microphone_permission() -> Result<bool, OpenError> {
    unsafe {
        CoInitializeEx(None, COINIT_MULTITHREADED)
            .ok()
            .map_err(|e| OpenError::Unsupported(format!("CoInitializeEx failed: {}", e)))?;

        let result = check_mic_access_inner();

        CoUninitialize();
        result
    }
}

unsafe fn check_mic_access_inner() -> Result<bool, OpenError> {
    let enumerator: IMMDeviceEnumerator = CoCreateInstance(&MMDeviceEnumerator, None, CLSCTX_ALL)
        .map_err(|e| OpenError::Unsupported(format!("failed to create enumerator: {}", e)))?;

    let device = match enumerator.GetDefaultAudioEndpoint(eCapture, eConsole) {
        Ok(d) => d,
        Err(_) => return Ok(false), // No capture device
    };

    let result: Result<IAudioClient, windows::core::Error> = device.Activate(CLSCTX_ALL, None);

    match result {
        Ok(_) => Ok(true),
        Err(e) => {
            let code = e.code();
            if code == E_ACCESSDENIED || code == AUDCLNT_E_DEVICE_IN_USE {
                Ok(false)
            } else {
                // Other error — assume available but report
                log::warn!("unexpected error checking mic permission: {}", e);
                Ok(true)
            }
        }
    }
}
