// Transport reliability for vendor calls.
//
// Timeouts and transient-error retries live here, below the correction loop,
// so a re-sent HTTP call never counts as a correction attempt.

pub mod retry;

pub use retry::{RetryPolicy, Retryable};

use crate::audio::AudioClip;
use crate::stt::{SpeechTranscriber, Transcript, TranscriptionError};
use crate::tts::{SpeechSynthesizer, SynthesisError};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Runs `call` with a per-call timeout, retrying per `policy`.
async fn call_with_retry<T, E, F, Fut>(
    provider: &str,
    timeout: Duration,
    policy: &RetryPolicy,
    on_timeout: fn() -> E,
    mut call: F,
) -> Result<T, E>
where
    E: Retryable + std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0u32;

    loop {
        let result = match tokio::time::timeout(timeout, call()).await {
            Ok(result) => result,
            Err(_) => Err(on_timeout()),
        };

        match result {
            Ok(value) => return Ok(value),
            Err(e) => {
                tracing::warn!(
                    provider = provider,
                    call = attempt + 1,
                    max_calls = policy.max_retries() + 1,
                    error = %e,
                    "Vendor call failed"
                );

                if policy.should_retry(attempt, &e) {
                    policy.wait_before_retry(attempt).await;
                    attempt += 1;
                    continue;
                }

                return Err(e);
            }
        }
    }
}

pub struct ReliableSynthesizer {
    inner: Arc<dyn SpeechSynthesizer>,
    timeout: Duration,
    retry_policy: RetryPolicy,
}

impl ReliableSynthesizer {
    pub fn new(
        inner: Arc<dyn SpeechSynthesizer>,
        timeout: Duration,
        retry_policy: RetryPolicy,
    ) -> Self {
        Self {
            inner,
            timeout,
            retry_policy,
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for ReliableSynthesizer {
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<AudioClip, SynthesisError> {
        call_with_retry(
            self.inner.name(),
            self.timeout,
            &self.retry_policy,
            || SynthesisError::TimeoutError,
            || self.inner.synthesize(text, voice_id),
        )
        .await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

pub struct ReliableTranscriber {
    inner: Arc<dyn SpeechTranscriber>,
    timeout: Duration,
    retry_policy: RetryPolicy,
}

impl ReliableTranscriber {
    pub fn new(
        inner: Arc<dyn SpeechTranscriber>,
        timeout: Duration,
        retry_policy: RetryPolicy,
    ) -> Self {
        Self {
            inner,
            timeout,
            retry_policy,
        }
    }
}

#[async_trait]
impl SpeechTranscriber for ReliableTranscriber {
    async fn transcribe(
        &self,
        audio: &AudioClip,
        language_hint: Option<&str>,
    ) -> Result<Transcript, TranscriptionError> {
        call_with_retry(
            self.inner.name(),
            self.timeout,
            &self.retry_policy,
            || TranscriptionError::TimeoutError,
            || self.inner.transcribe(audio, language_hint),
        )
        .await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
