// ElevenLabs Scribe STT Adapter

use super::types::error_from_response;
use super::{SpeechTranscriber, Transcript, TranscriptionError};
use crate::audio::AudioClip;
use async_trait::async_trait;
use reqwest::multipart;
use serde::Deserialize;
use std::time::Duration;

const ELEVENLABS_API_URL: &str = "https://api.elevenlabs.io/v1/speech-to-text";
const SCRIBE_MODEL: &str = "scribe_v1";
const TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Deserialize)]
struct ElevenLabsResponse {
    text: String,
    #[serde(default)]
    language_code: Option<String>,
}

pub struct ElevenLabsTranscriber {
    api_key: String,
    client: reqwest::Client,
}

impl ElevenLabsTranscriber {
    pub fn new(api_key: String) -> Result<Self, TranscriptionError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .build()
            .map_err(|e| TranscriptionError::ProviderError(format!("HTTP client: {}", e)))?;

        tracing::info!("ElevenLabs Scribe transcriber initialized");

        Ok(Self { api_key, client })
    }
}

#[async_trait]
impl SpeechTranscriber for ElevenLabsTranscriber {
    async fn transcribe(
        &self,
        audio: &AudioClip,
        language_hint: Option<&str>,
    ) -> Result<Transcript, TranscriptionError> {
        if audio.is_empty() {
            return Err(TranscriptionError::InvalidAudio);
        }

        tracing::debug!(bytes = audio.len(), "ElevenLabs STT: transcribing");

        let file_part = multipart::Part::bytes(audio.bytes.clone())
            .file_name(format!("audio.{}", audio.extension()))
            .mime_str(&audio.content_type)
            .map_err(|e| TranscriptionError::ProviderError(e.to_string()))?;

        let mut form = multipart::Form::new()
            .text("model_id", SCRIBE_MODEL)
            .part("file", file_part);

        if let Some(language) = language_hint {
            form = form.text("language_code", language.to_string());
        }

        let resp = self
            .client
            .post(ELEVENLABS_API_URL)
            .header("xi-api-key", &self.api_key)
            .multipart(form)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }

        let eleven_resp: ElevenLabsResponse = resp
            .json()
            .await
            .map_err(|e| TranscriptionError::ProviderError(e.to_string()))?;

        Ok(Transcript {
            text: eleven_resp.text.trim().to_string(),
            language: eleven_resp
                .language_code
                .or_else(|| language_hint.map(str::to_string)),
            provider: "ElevenLabs".to_string(),
        })
    }

    fn name(&self) -> &str {
        "ElevenLabs Scribe"
    }
}
