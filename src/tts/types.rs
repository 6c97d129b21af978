// TTS Error Definitions

use thiserror::Error;

/// Synthesis error types with retry classification
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    TimeoutError,

    #[error("Authentication failed")]
    AuthenticationError,

    #[error("Rate limit exceeded")]
    RateLimitError,

    #[error("Unknown or invalid voice: {0}")]
    InvalidVoice(String),

    #[error("Provider returned no audio")]
    EmptyAudio,

    #[error("Provider unavailable (HTTP {0})")]
    ServerError(u16),

    #[error("Provider error: {0}")]
    ProviderError(String),
}

impl SynthesisError {
    /// Returns true if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SynthesisError::NetworkError(_)
                | SynthesisError::TimeoutError
                | SynthesisError::RateLimitError
                | SynthesisError::ServerError(_)
        )
    }
}

impl From<reqwest::Error> for SynthesisError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SynthesisError::TimeoutError
        } else {
            SynthesisError::NetworkError(e.to_string())
        }
    }
}
