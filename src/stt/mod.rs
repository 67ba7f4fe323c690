//! Speech-to-text transcription.
//!
//! One request per complete utterance; there is no streaming recognition.

pub mod remote;
pub mod transcriber;

pub use remote::RemoteTranscriber;
pub use transcriber::{MockTranscriber, Transcriber};
