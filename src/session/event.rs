//! Events surfaced by a session to its caller.

/// Events emitted by a [`SpeechSegmentSession`](crate::session::SpeechSegmentSession).
///
/// Delivered in the order their triggering conditions occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Speech has started after silence. Emitted once per utterance.
    SpeechStart,
    /// An utterance was flushed for transcription. Always carries the fixed
    /// placeholder string; this core produces no incremental text.
    Partial(String),
    /// The final transcript of a completed utterance.
    Transcript(String),
}

impl SessionEvent {
    /// Returns true if this is a final transcript.
    pub fn is_transcript(&self) -> bool {
        matches!(self, SessionEvent::Transcript(_))
    }

    /// Extracts the transcript text if this is a Transcript variant.
    pub fn into_transcript(self) -> Option<String> {
        match self {
            SessionEvent::Transcript(text) => Some(text),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_equality() {
        assert_eq!(SessionEvent::SpeechStart, SessionEvent::SpeechStart);
        assert_ne!(
            SessionEvent::Partial("…".to_string()),
            SessionEvent::Transcript("…".to_string())
        );
    }

    #[test]
    fn test_into_transcript() {
        let event = SessionEvent::Transcript("hello".to_string());
        assert!(event.is_transcript());
        assert_eq!(event.into_transcript().as_deref(), Some("hello"));

        assert_eq!(SessionEvent::SpeechStart.into_transcript(), None);
    }
}
