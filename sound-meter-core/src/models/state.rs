use serde::{Deserialize, Serialize};

/// Metering session state machine.
///
/// State transitions:
/// ```text
/// initializing → stream_ready → recording → stopped
///        ↘            ↓             ↓
///          ─ ─ ─ → error(reason)  ← ┘
/// ```
///
/// `Error` is reachable from any state and terminal; the worker does not
/// retry device initialization on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum RecordingStatus {
    Initializing,
    StreamReady,
    Recording,
    Stopped,
    Error(String),
}

impl RecordingStatus {
    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped | Self::Error(_))
    }

    /// The failure reason, if the session has failed.
    pub fn error_reason(&self) -> Option<&str> {
        match self {
            Self::Error(reason) => Some(reason),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_predicate() {
        assert!(RecordingStatus::Recording.is_recording());
        assert!(!RecordingStatus::StreamReady.is_recording());
    }

    #[test]
    fn terminal_states() {
        assert!(RecordingStatus::Stopped.is_terminal());
        assert!(RecordingStatus::Error("gone".into()).is_terminal());
        assert!(!RecordingStatus::Initializing.is_terminal());
        assert!(!RecordingStatus::Recording.is_terminal());
    }

    #[test]
    fn error_reason_accessor() {
        let status = RecordingStatus::Error("device unplugged".into());
        assert_eq!(status.error_reason(), Some("device unplugged"));
        assert_eq!(RecordingStatus::Stopped.error_reason(), None);
    }
}
