// Scripted collaborators shared by unit tests.

use crate::audio::AudioClip;
use crate::stt::{SpeechTranscriber, Transcript, TranscriptionError};
use crate::tts::{SpeechSynthesizer, SynthesisError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Returns a fresh clip per call; optionally fails on one 1-based call.
#[derive(Default)]
pub struct ScriptedSynthesizer {
    calls: AtomicU32,
    fail_on_call: Option<u32>,
    delay: Option<Duration>,
}

impl ScriptedSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(call: u32) -> Self {
        Self {
            fail_on_call: Some(call),
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechSynthesizer for ScriptedSynthesizer {
    async fn synthesize(&self, text: &str, _voice_id: &str) -> Result<AudioClip, SynthesisError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_on_call == Some(call) {
            return Err(SynthesisError::ProviderError(format!(
                "scripted failure on call {call}"
            )));
        }
        let mut bytes = text.as_bytes().to_vec();
        bytes.extend_from_slice(&call.to_le_bytes());
        Ok(AudioClip::new(bytes, "audio/mpeg"))
    }

    fn name(&self) -> &str {
        "scripted-tts"
    }
}

/// Replays transcripts in order; the last one repeats once the script runs out.
pub struct ScriptedTranscriber {
    script: Vec<String>,
    calls: AtomicU32,
    fail_on_call: Option<u32>,
    hints: Mutex<Vec<Option<String>>>,
}

impl ScriptedTranscriber {
    pub fn new<I, S>(script: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: script.into_iter().map(Into::into).collect(),
            calls: AtomicU32::new(0),
            fail_on_call: None,
            hints: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_on(mut self, call: u32) -> Self {
        self.fail_on_call = Some(call);
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn hints(&self) -> Vec<Option<String>> {
        self.hints.lock().map(|h| h.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl SpeechTranscriber for ScriptedTranscriber {
    async fn transcribe(
        &self,
        _audio: &AudioClip,
        language_hint: Option<&str>,
    ) -> Result<Transcript, TranscriptionError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Ok(mut hints) = self.hints.lock() {
            hints.push(language_hint.map(str::to_string));
        }
        if self.fail_on_call == Some(call) {
            return Err(TranscriptionError::ProviderError(format!(
                "scripted failure on call {call}"
            )));
        }
        let index = (call as usize - 1).min(self.script.len().saturating_sub(1));
        let text = self.script.get(index).cloned().unwrap_or_default();
        Ok(Transcript {
            text,
            language: language_hint.map(str::to_string),
            provider: "scripted-stt".to_string(),
        })
    }

    fn name(&self) -> &str {
        "scripted-stt"
    }
}
