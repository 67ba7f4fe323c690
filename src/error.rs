//! Error types for callscribe.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CallscribeError {
    // Configuration errors
    #[error("Failed to parse configuration: {message}")]
    ConfigParse { message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error(
        "Missing transcription API key: set stt.api_key in the configuration \
         or the GROQ_API_KEY environment variable"
    )]
    MissingApiKey,

    // Audio errors
    #[error("Failed to encode WAV container: {message}")]
    WavEncode { message: String },

    // Transcription errors
    #[error("Transcription request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transcription API error {status}: {body}")]
    TranscriptionApi { status: u16, body: String },

    // Session errors
    #[error("Session is closed")]
    SessionClosed,

    #[error("Timed out waiting for a transcript after {timeout_ms}ms")]
    TranscriptTimeout { timeout_ms: u64 },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, CallscribeError>;
