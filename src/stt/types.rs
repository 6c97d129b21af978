// STT Types and Error Definitions

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Transcription result from any STT provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    /// Transcribed text
    pub text: String,
    /// Detected or requested language (e.g., "ko", "en")
    pub language: Option<String>,
    /// Provider name (e.g., "OpenAI Whisper", "ElevenLabs Scribe")
    pub provider: String,
}

/// STT Error types with retry classification
#[derive(Debug, Error)]
pub enum TranscriptionError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    TimeoutError,

    #[error("Invalid audio format")]
    InvalidAudio,

    #[error("Authentication failed")]
    AuthenticationError,

    #[error("Rate limit exceeded")]
    RateLimitError,

    #[error("Provider unavailable (HTTP {0})")]
    ServerError(u16),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),
}

impl TranscriptionError {
    /// Returns true if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TranscriptionError::NetworkError(_)
                | TranscriptionError::TimeoutError
                | TranscriptionError::RateLimitError
                | TranscriptionError::ServerError(_)
        )
    }
}

impl From<reqwest::Error> for TranscriptionError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TranscriptionError::TimeoutError
        } else {
            TranscriptionError::NetworkError(e.to_string())
        }
    }
}

/// Shared status-code mapping for the HTTP transcription vendors.
pub(crate) async fn error_from_response(resp: reqwest::Response) -> TranscriptionError {
    let status = resp.status();
    match status.as_u16() {
        401 => TranscriptionError::AuthenticationError,
        429 => TranscriptionError::RateLimitError,
        code if status.is_server_error() => TranscriptionError::ServerError(code),
        _ => {
            let error_text = resp.text().await.unwrap_or_default();
            TranscriptionError::ProviderError(format!("HTTP {}: {}", status, error_text))
        }
    }
}
