// STT Module - Speech-to-Text Adapters

mod elevenlabs;
mod openai_whisper;
mod types;
mod whisper;

pub use elevenlabs::ElevenLabsTranscriber;
pub use openai_whisper::OpenAiWhisperTranscriber;
pub use types::{Transcript, TranscriptionError};
pub use whisper::WhisperCppTranscriber;

use crate::audio::AudioClip;
use async_trait::async_trait;

/// Unified transcription trait
#[async_trait]
pub trait SpeechTranscriber: Send + Sync {
    /// Transcribe encoded audio to text
    async fn transcribe(
        &self,
        audio: &AudioClip,
        language_hint: Option<&str>,
    ) -> Result<Transcript, TranscriptionError>;

    /// Get provider name
    fn name(&self) -> &str;
}
