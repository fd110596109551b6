//! Error types for the sparring system.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SparringError {
    #[error("Microphone access denied: {0}")]
    MicrophoneDenied(String),

    #[error("Audio capture failed: {0}")]
    CaptureError(String),

    #[error("Audio encoding error: {0}")]
    AudioEncoding(#[from] hound::Error),

    #[error("Remote request failed: {0}")]
    RemoteError(#[from] reqwest::Error),

    #[error("Unexpected remote reply: {0}")]
    RemoteReply(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid {kind}: '{value}' (expected one of: {expected})")]
    InvalidChoice {
        kind: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("Response generation failed: {0}")]
    ResponseError(String),

    #[error("Transcription failed: {0}")]
    TranscriptionError(String),
}
