//! Default configuration constants for callscribe.
//!
//! This module provides shared constants used across different configuration types
//! to ensure consistency and eliminate duplication.

/// Default audio sample rate in Hz.
///
/// 8kHz is the fixed rate of telephony-grade mu-law audio (ITU-T G.711).
/// The transport pushes frames at this rate; it is never derived from input.
pub const SAMPLE_RATE: u32 = 8000;

/// Default Voice Activity Detection (VAD) threshold.
///
/// This RMS-based threshold (0.0 to 1.0) determines when audio is considered speech.
/// A value of 0.01 is tuned for typical phone-line levels and provides good
/// sensitivity while filtering out line noise.
pub const VAD_THRESHOLD: f32 = 0.01;

/// Default silence duration in milliseconds before an utterance is considered ended.
///
/// 800ms allows for short natural pauses in speech without prematurely cutting
/// an utterance in half.
pub const SILENCE_DURATION_MS: u32 = 800;

/// Minimum utterance duration in milliseconds worth transcribing.
///
/// Buffered speech shorter than this is treated as noise (a cough, a line click)
/// and discarded without a transcription request.
pub const MIN_UTTERANCE_MS: u32 = 200;

/// Minimum number of buffered samples for an utterance to be transcribed.
///
/// Computed from the fixed telephony sample rate, not from observed frame sizes:
/// 200ms at 8kHz = 1600 samples.
pub const fn min_utterance_samples() -> usize {
    (SAMPLE_RATE as usize * MIN_UTTERANCE_MS as usize) / 1000
}

/// Default transcription model identifier.
pub const DEFAULT_MODEL: &str = "whisper-large-v3-turbo";

/// Default base URL of the OpenAI-compatible transcription API.
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Environment variable consulted for the transcription API key when the
/// configuration file does not provide one.
pub const API_KEY_ENV: &str = "GROQ_API_KEY";

/// Fixed placeholder emitted as the partial result when an utterance is flushed.
///
/// This core transcribes complete utterances only; the partial event signals
/// "transcription started", it never carries incremental text.
pub const PARTIAL_PLACEHOLDER: &str = "…";
