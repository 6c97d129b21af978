use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_ACCURACY_THRESHOLD: f64 = 0.95;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestValidationError {
    #[error("source text must not be blank")]
    BlankSourceText,

    #[error("voice id must not be blank")]
    BlankVoiceId,

    #[error("accuracy threshold must be in (0, 1], got {0}")]
    ThresholdOutOfRange(f64),

    #[error("max attempts must be at least 1")]
    ZeroAttempts,
}

/// Fallbacks used when a payload omits threshold or attempt budget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequestDefaults {
    pub accuracy_threshold: f64,
    pub max_attempts: u32,
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self {
            accuracy_threshold: DEFAULT_ACCURACY_THRESHOLD,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// A validated correction request. Fields are private so every instance has
/// passed validation; the request is read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisRequest {
    source_text: String,
    voice_id: String,
    language_hint: Option<String>,
    accuracy_threshold: f64,
    max_attempts: u32,
}

impl SynthesisRequest {
    pub fn new(
        source_text: impl Into<String>,
        voice_id: impl Into<String>,
    ) -> Result<Self, RequestValidationError> {
        let source_text = source_text.into();
        let voice_id = voice_id.into();

        if source_text.trim().is_empty() {
            return Err(RequestValidationError::BlankSourceText);
        }
        if voice_id.trim().is_empty() {
            return Err(RequestValidationError::BlankVoiceId);
        }

        Ok(Self {
            source_text,
            voice_id,
            language_hint: None,
            accuracy_threshold: DEFAULT_ACCURACY_THRESHOLD,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        })
    }

    pub fn with_language_hint(mut self, language_hint: impl Into<String>) -> Self {
        let hint = language_hint.into();
        let trimmed = hint.trim();
        self.language_hint = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        self
    }

    pub fn with_accuracy_threshold(mut self, threshold: f64) -> Result<Self, RequestValidationError> {
        if !(threshold.is_finite() && threshold > 0.0 && threshold <= 1.0) {
            return Err(RequestValidationError::ThresholdOutOfRange(threshold));
        }
        self.accuracy_threshold = threshold;
        Ok(self)
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Result<Self, RequestValidationError> {
        if max_attempts == 0 {
            return Err(RequestValidationError::ZeroAttempts);
        }
        self.max_attempts = max_attempts;
        Ok(self)
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn voice_id(&self) -> &str {
        &self.voice_id
    }

    pub fn language_hint(&self) -> Option<&str> {
        self.language_hint.as_deref()
    }

    pub fn accuracy_threshold(&self) -> f64 {
        self.accuracy_threshold
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

/// Wire shape of a submission; turned into a [`SynthesisRequest`] through the
/// same validation as the builder.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisRequestPayload {
    pub source_text: String,
    pub voice_id: String,
    #[serde(default)]
    pub language_hint: Option<String>,
    #[serde(default)]
    pub accuracy_threshold: Option<f64>,
    #[serde(default)]
    pub max_attempts: Option<u32>,
}

impl SynthesisRequestPayload {
    pub fn into_request(
        self,
        defaults: RequestDefaults,
    ) -> Result<SynthesisRequest, RequestValidationError> {
        let mut request = SynthesisRequest::new(self.source_text, self.voice_id)?
            .with_accuracy_threshold(
                self.accuracy_threshold
                    .unwrap_or(defaults.accuracy_threshold),
            )?
            .with_max_attempts(self.max_attempts.unwrap_or(defaults.max_attempts))?;

        if let Some(hint) = self.language_hint {
            request = request.with_language_hint(hint);
        }

        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply() {
        let request = SynthesisRequest::new("안녕하세요", "voice-1").unwrap();
        assert_eq!(request.accuracy_threshold(), 0.95);
        assert_eq!(request.max_attempts(), 5);
        assert_eq!(request.language_hint(), None);
    }

    #[test]
    fn blank_fields_are_rejected() {
        assert_eq!(
            SynthesisRequest::new("  ", "voice").unwrap_err(),
            RequestValidationError::BlankSourceText
        );
        assert_eq!(
            SynthesisRequest::new("text", "").unwrap_err(),
            RequestValidationError::BlankVoiceId
        );
    }

    #[test]
    fn threshold_bounds() {
        let base = SynthesisRequest::new("text", "voice").unwrap();
        assert!(base.clone().with_accuracy_threshold(1.0).is_ok());
        assert!(base.clone().with_accuracy_threshold(0.01).is_ok());
        assert!(base.clone().with_accuracy_threshold(0.0).is_err());
        assert!(base.clone().with_accuracy_threshold(1.01).is_err());
        assert!(base.clone().with_accuracy_threshold(-0.5).is_err());
        assert!(base.with_accuracy_threshold(f64::NAN).is_err());
    }

    #[test]
    fn single_attempt_is_valid_zero_is_not() {
        let base = SynthesisRequest::new("text", "voice").unwrap();
        assert_eq!(base.clone().with_max_attempts(1).unwrap().max_attempts(), 1);
        assert_eq!(
            base.with_max_attempts(0).unwrap_err(),
            RequestValidationError::ZeroAttempts
        );
    }

    #[test]
    fn blank_language_hint_is_dropped() {
        let request = SynthesisRequest::new("text", "voice")
            .unwrap()
            .with_language_hint("  ");
        assert_eq!(request.language_hint(), None);

        let request = request.with_language_hint(" ko ");
        assert_eq!(request.language_hint(), Some("ko"));
    }

    #[test]
    fn payload_uses_configured_defaults() {
        let payload: SynthesisRequestPayload =
            serde_json::from_str(r#"{"sourceText":"hello","voiceId":"v1","languageHint":"en"}"#)
                .unwrap();
        let defaults = RequestDefaults {
            accuracy_threshold: 0.9,
            max_attempts: 3,
        };

        let request = payload.into_request(defaults).unwrap();
        assert_eq!(request.accuracy_threshold(), 0.9);
        assert_eq!(request.max_attempts(), 3);
        assert_eq!(request.language_hint(), Some("en"));
    }

    #[test]
    fn payload_values_override_defaults_and_are_validated() {
        let payload: SynthesisRequestPayload = serde_json::from_str(
            r#"{"sourceText":"hello","voiceId":"v1","accuracyThreshold":0.8,"maxAttempts":2}"#,
        )
        .unwrap();
        let request = payload.into_request(RequestDefaults::default()).unwrap();
        assert_eq!(request.accuracy_threshold(), 0.8);
        assert_eq!(request.max_attempts(), 2);

        let payload: SynthesisRequestPayload =
            serde_json::from_str(r#"{"sourceText":"hello","voiceId":"v1","maxAttempts":0}"#)
                .unwrap();
        assert_eq!(
            payload.into_request(RequestDefaults::default()).unwrap_err(),
            RequestValidationError::ZeroAttempts
        );
    }
}
