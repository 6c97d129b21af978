// OpenAI Whisper API Adapter

use super::types::error_from_response;
use super::{SpeechTranscriber, Transcript, TranscriptionError};
use crate::audio::AudioClip;
use async_trait::async_trait;
use reqwest::multipart;
use serde::Deserialize;
use std::time::Duration;

const OPENAI_TRANSCRIPTIONS_URL: &str = "https://api.openai.com/v1/audio/transcriptions";
const WHISPER_MODEL: &str = "whisper-1";
const TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Deserialize)]
struct WhisperResponse {
    text: String,
    #[serde(default)]
    language: Option<String>,
}

pub struct OpenAiWhisperTranscriber {
    api_key: String,
    url: String,
    client: reqwest::Client,
}

impl OpenAiWhisperTranscriber {
    pub fn new(api_key: String) -> Result<Self, TranscriptionError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .build()
            .map_err(|e| TranscriptionError::ProviderError(format!("HTTP client: {}", e)))?;

        tracing::info!("OpenAI Whisper transcriber initialized");

        Ok(Self {
            api_key,
            url: OPENAI_TRANSCRIPTIONS_URL.to_string(),
            client,
        })
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

#[async_trait]
impl SpeechTranscriber for OpenAiWhisperTranscriber {
    async fn transcribe(
        &self,
        audio: &AudioClip,
        language_hint: Option<&str>,
    ) -> Result<Transcript, TranscriptionError> {
        if audio.is_empty() {
            return Err(TranscriptionError::InvalidAudio);
        }

        tracing::debug!(bytes = audio.len(), "OpenAI Whisper: transcribing");

        let file_part = multipart::Part::bytes(audio.bytes.clone())
            .file_name(format!("audio.{}", audio.extension()))
            .mime_str(&audio.content_type)
            .map_err(|e| TranscriptionError::ProviderError(e.to_string()))?;

        let mut form = multipart::Form::new()
            .text("model", WHISPER_MODEL)
            .text("response_format", "json")
            .part("file", file_part);

        if let Some(language) = language_hint {
            form = form.text("language", language.to_string());
        }

        let resp = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }

        let body: WhisperResponse = resp
            .json()
            .await
            .map_err(|e| TranscriptionError::ProviderError(e.to_string()))?;

        Ok(Transcript {
            text: body.text.trim().to_string(),
            language: body.language.or_else(|| language_hint.map(str::to_string)),
            provider: "OpenAI Whisper".to_string(),
        })
    }

    fn name(&self) -> &str {
        "OpenAI Whisper"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_audio_is_rejected_locally() {
        let transcriber = OpenAiWhisperTranscriber::new("sk-test".to_string())
            .unwrap()
            .with_url("http://127.0.0.1:9/v1/audio/transcriptions");
        let clip = AudioClip::new(Vec::new(), "audio/mpeg");

        let result = transcriber.transcribe(&clip, Some("ko")).await;
        assert!(matches!(result, Err(TranscriptionError::InvalidAudio)));
    }

    #[test]
    fn response_language_is_optional() {
        let body: WhisperResponse = serde_json::from_str(r#"{"text":" 안녕하세요 "}"#).unwrap();
        assert_eq!(body.text, " 안녕하세요 ");
        assert!(body.language.is_none());
    }
}
