//! Speech segmentation sessions.
//!
//! A session consumes a push-stream of mu-law frames, detects utterance
//! boundaries, and dispatches each complete utterance for transcription:
//! ```text
//! ┌───────────┐    ┌────────┐    ┌─────────┐    ┌───────────────┐
//! │ Telephony │───▶│ mu-law │───▶│ RMS VAD │───▶│ Utterance     │───▶ WAV ──▶ Transcriber
//! │ transport │    │ decode │    │         │    │ buffer + timer│
//! └───────────┘    └────────┘    └─────────┘    └───────────────┘
//! ```

pub mod event;
pub mod session;

pub use event::SessionEvent;
pub use session::{SessionConfig, SessionState, SpeechSegmentSession};
