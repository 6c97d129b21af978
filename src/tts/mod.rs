// TTS Module - Text-to-Speech Adapters

mod elevenlabs;
mod types;

pub use elevenlabs::ElevenLabsSynthesizer;
pub use types::SynthesisError;

use crate::audio::AudioClip;
use async_trait::async_trait;

/// Unified speech synthesis trait
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Render `text` with the given voice profile
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<AudioClip, SynthesisError>;

    /// Get provider name
    fn name(&self) -> &str;
}
