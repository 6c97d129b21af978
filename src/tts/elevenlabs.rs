// ElevenLabs Text-to-Speech Adapter

use super::{SpeechSynthesizer, SynthesisError};
use crate::audio::{clip::CONTENT_TYPE_MPEG, clip::CONTENT_TYPE_WAV, wav, AudioClip};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Serialize;
use std::time::Duration;

const ELEVENLABS_TTS_URL: &str = "https://api.elevenlabs.io/v1/text-to-speech";
const TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Serialize)]
struct ElevenLabsRequest<'a> {
    text: &'a str,
    model_id: &'a str,
}

pub struct ElevenLabsSynthesizer {
    api_key: String,
    model_id: String,
    output_format: String,
    base_url: String,
    client: reqwest::Client,
}

impl ElevenLabsSynthesizer {
    pub fn new(
        api_key: String,
        model_id: String,
        output_format: String,
    ) -> Result<Self, SynthesisError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .build()
            .map_err(|e| SynthesisError::ProviderError(format!("HTTP client: {}", e)))?;

        tracing::info!(
            model_id = %model_id,
            output_format = %output_format,
            "ElevenLabs synthesizer initialized"
        );

        Ok(Self {
            api_key,
            model_id,
            output_format,
            base_url: ELEVENLABS_TTS_URL.to_string(),
            client,
        })
    }

    /// Point the adapter at a different host (proxies, mock servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn is_valid_voice_id(voice_id: &str) -> bool {
        !voice_id.is_empty()
            && voice_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    }

    fn accept_header(&self) -> &'static str {
        if wav::pcm_sample_rate(&self.output_format).is_some() {
            "audio/pcm"
        } else {
            CONTENT_TYPE_MPEG
        }
    }

    /// Wrap headerless PCM in a WAV container; pass encoded formats through.
    fn clip_from(&self, bytes: Vec<u8>, content_type: Option<String>) -> AudioClip {
        match wav::pcm_sample_rate(&self.output_format) {
            Some(sample_rate) => {
                AudioClip::new(wav::encode_pcm16_le(&bytes, sample_rate, 1), CONTENT_TYPE_WAV)
            }
            None => AudioClip::new(
                bytes,
                content_type.unwrap_or_else(|| CONTENT_TYPE_MPEG.to_string()),
            ),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsSynthesizer {
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<AudioClip, SynthesisError> {
        if !Self::is_valid_voice_id(voice_id) {
            return Err(SynthesisError::InvalidVoice(voice_id.to_string()));
        }

        tracing::debug!(
            voice_id = %voice_id,
            chars = text.chars().count(),
            "ElevenLabs TTS: synthesizing"
        );

        let url = format!("{}/{}", self.base_url, voice_id);
        let response = self
            .client
            .post(url)
            .header("xi-api-key", &self.api_key)
            .header(ACCEPT, self.accept_header())
            .query(&[("output_format", self.output_format.as_str())])
            .json(&ElevenLabsRequest {
                text,
                model_id: &self.model_id,
            })
            .send()
            .await?;

        let status = response.status();

        if status.is_success() {
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);
            let bytes = response.bytes().await?.to_vec();

            if bytes.is_empty() {
                return Err(SynthesisError::EmptyAudio);
            }

            let clip = self.clip_from(bytes, content_type);
            tracing::debug!(bytes = clip.len(), content_type = %clip.content_type, "ElevenLabs TTS: done");
            return Ok(clip);
        }

        match status.as_u16() {
            401 => Err(SynthesisError::AuthenticationError),
            404 | 422 => Err(SynthesisError::InvalidVoice(voice_id.to_string())),
            429 => Err(SynthesisError::RateLimitError),
            code if status.is_server_error() => Err(SynthesisError::ServerError(code)),
            _ => {
                let error_text = response.text().await.unwrap_or_default();
                Err(SynthesisError::ProviderError(format!(
                    "HTTP {}: {}",
                    status, error_text
                )))
            }
        }
    }

    fn name(&self) -> &str {
        "ElevenLabs TTS"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synthesizer(output_format: &str) -> ElevenLabsSynthesizer {
        ElevenLabsSynthesizer::new(
            "sk_test".to_string(),
            "eleven_multilingual_v2".to_string(),
            output_format.to_string(),
        )
        .unwrap()
    }

    #[test]
    fn voice_ids_are_validated() {
        assert!(ElevenLabsSynthesizer::is_valid_voice_id("21m00Tcm4TlvDq8ikWAM"));
        assert!(ElevenLabsSynthesizer::is_valid_voice_id("my-voice_2"));
        assert!(!ElevenLabsSynthesizer::is_valid_voice_id(""));
        assert!(!ElevenLabsSynthesizer::is_valid_voice_id("../admin"));
        assert!(!ElevenLabsSynthesizer::is_valid_voice_id("a b"));
    }

    #[tokio::test]
    async fn invalid_voice_fails_before_any_request() {
        let result = synthesizer("mp3_44100_128")
            .with_base_url("http://127.0.0.1:9")
            .synthesize("hello", "bad/voice")
            .await;
        assert!(matches!(result, Err(SynthesisError::InvalidVoice(_))));
    }

    #[test]
    fn pcm_output_is_wrapped_in_wav() {
        let clip = synthesizer("pcm_16000").clip_from(vec![0u8; 320], None);
        assert_eq!(clip.content_type, CONTENT_TYPE_WAV);
        assert_eq!(clip.len(), wav::WAV_HEADER_LEN + 320);
        assert_eq!(&clip.bytes[0..4], b"RIFF");
    }

    #[test]
    fn encoded_output_keeps_vendor_content_type() {
        let tts = synthesizer("mp3_44100_128");
        let clip = tts.clip_from(vec![1, 2, 3], Some("audio/mpeg".to_string()));
        assert_eq!(clip.content_type, "audio/mpeg");
        assert_eq!(clip.bytes, vec![1, 2, 3]);

        let clip = tts.clip_from(vec![1], None);
        assert_eq!(clip.content_type, CONTENT_TYPE_MPEG);
    }

    #[test]
    fn only_transient_errors_are_retryable() {
        assert!(SynthesisError::TimeoutError.is_retryable());
        assert!(SynthesisError::RateLimitError.is_retryable());
        assert!(SynthesisError::ServerError(503).is_retryable());
        assert!(SynthesisError::NetworkError("reset".into()).is_retryable());
        assert!(!SynthesisError::AuthenticationError.is_retryable());
        assert!(!SynthesisError::InvalidVoice("x".into()).is_retryable());
        assert!(!SynthesisError::EmptyAudio.is_retryable());
    }
}
