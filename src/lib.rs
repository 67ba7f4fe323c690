//! callscribe - Streaming speech segmentation and transcription for telephony audio
//!
//! Ingests a push-stream of 8kHz mu-law frames, segments it into utterances
//! with energy-based voice activity detection, and transcribes each complete
//! utterance through an OpenAI-compatible remote endpoint.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
pub mod config;
pub mod defaults;
pub mod error;
pub mod session;
pub mod stt;

// Session surface
pub use session::{SessionConfig, SessionEvent, SessionState, SpeechSegmentSession};

// Transcription (source → session → transcriber)
pub use stt::{MockTranscriber, RemoteTranscriber, Transcriber};

// Error handling
pub use error::{CallscribeError, Result};

// Config
pub use config::{AudioConfig, Config, SttConfig};
