// Builds the configured vendor adapters, wrapped in the transport layer.

use crate::config::{AppConfig, TranscriberKind};
use crate::stt::{
    ElevenLabsTranscriber, OpenAiWhisperTranscriber, SpeechTranscriber, WhisperCppTranscriber,
};
use crate::transport::{ReliableSynthesizer, ReliableTranscriber};
use crate::tts::{ElevenLabsSynthesizer, SpeechSynthesizer};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{0} is not set")]
    MissingApiKey(&'static str),

    #[error("whisper.cpp binary or model not found")]
    WhisperCppUnavailable,

    #[error("failed to initialize {provider}: {message}")]
    Init {
        provider: &'static str,
        message: String,
    },
}

pub fn synthesizer_from_config(
    config: &AppConfig,
) -> Result<Arc<dyn SpeechSynthesizer>, ProviderError> {
    let key = config
        .elevenlabs_api_key
        .clone()
        .ok_or(ProviderError::MissingApiKey("ELEVENLABS_API_KEY"))?;

    let synthesizer = ElevenLabsSynthesizer::new(
        key,
        config.elevenlabs_model_id.clone(),
        config.elevenlabs_output_format.clone(),
    )
    .map_err(|e| ProviderError::Init {
        provider: "elevenlabs-tts",
        message: e.to_string(),
    })?;

    Ok(Arc::new(ReliableSynthesizer::new(
        Arc::new(synthesizer),
        config.synthesis_timeout(),
        config.retry_policy(),
    )))
}

pub fn transcriber_from_config(
    config: &AppConfig,
) -> Result<Arc<dyn SpeechTranscriber>, ProviderError> {
    let transcriber: Arc<dyn SpeechTranscriber> = match config.transcriber {
        TranscriberKind::OpenAiWhisper => {
            let key = config
                .openai_api_key
                .clone()
                .ok_or(ProviderError::MissingApiKey("OPENAI_API_KEY"))?;
            let adapter = OpenAiWhisperTranscriber::new(key).map_err(|e| ProviderError::Init {
                provider: "openai-whisper",
                message: e.to_string(),
            })?;
            Arc::new(adapter)
        }
        TranscriberKind::ElevenLabs => {
            let key = config
                .elevenlabs_api_key
                .clone()
                .ok_or(ProviderError::MissingApiKey("ELEVENLABS_API_KEY"))?;
            let adapter = ElevenLabsTranscriber::new(key).map_err(|e| ProviderError::Init {
                provider: "elevenlabs-scribe",
                message: e.to_string(),
            })?;
            Arc::new(adapter)
        }
        TranscriberKind::WhisperCpp => {
            let adapter = WhisperCppTranscriber::discover(
                config.whisper_cpp_bin.clone(),
                config.whisper_model.clone(),
            )
            .ok_or(ProviderError::WhisperCppUnavailable)?;
            Arc::new(adapter)
        }
    };

    tracing::info!(provider = transcriber.name(), "Transcriber selected");

    Ok(Arc::new(ReliableTranscriber::new(
        transcriber,
        config.transcription_timeout(),
        config.retry_policy(),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_are_reported_by_name() {
        let config = AppConfig::default();

        let err = synthesizer_from_config(&config).err().unwrap();
        assert_eq!(err.to_string(), "ELEVENLABS_API_KEY is not set");

        let err = transcriber_from_config(&config).err().unwrap();
        assert_eq!(err.to_string(), "OPENAI_API_KEY is not set");
    }

    #[test]
    fn configured_providers_are_built() {
        let config = AppConfig {
            elevenlabs_api_key: Some("sk_test_key_123456".to_string()),
            transcriber: TranscriberKind::ElevenLabs,
            ..AppConfig::default()
        };

        let synthesizer = synthesizer_from_config(&config).unwrap();
        let transcriber = transcriber_from_config(&config).unwrap();
        assert!(!synthesizer.name().is_empty());
        assert!(!transcriber.name().is_empty());
    }
}
