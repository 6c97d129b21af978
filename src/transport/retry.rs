use std::time::Duration;
use tokio::time::sleep;

/// Errors that know whether re-sending the same call could succeed.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

impl Retryable for crate::tts::SynthesisError {
    fn is_retryable(&self) -> bool {
        crate::tts::SynthesisError::is_retryable(self)
    }
}

impl Retryable for crate::stt::TranscriptionError {
    fn is_retryable(&self) -> bool {
        crate::stt::TranscriptionError::is_retryable(self)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn should_retry<E: Retryable>(&self, attempt: u32, error: &E) -> bool {
        if attempt >= self.max_retries {
            return false;
        }

        error.is_retryable()
    }

    /// `base_delay * 2^attempt`, saturating.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let multiplier = 2u32.saturating_pow(attempt);
        self.base_delay.saturating_mul(multiplier)
    }

    pub async fn wait_before_retry(&self, attempt: u32) {
        let delay = self.delay_for(attempt);

        tracing::info!(
            delay_ms = delay.as_millis() as u64,
            next_call = attempt + 2,
            "Retrying vendor call"
        );
        sleep(delay).await;
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2, Duration::from_millis(500))
    }
}
