use crate::scoring::WordMismatch;
use crate::storage::AudioReference;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One synthesize → transcribe → score cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRecord {
    /// 1-based
    pub attempt_number: u32,
    pub transcribed_text: String,
    pub similarity_score: f64,
    pub audio_reference: AudioReference,
    #[serde(default)]
    pub mismatched_words: Vec<WordMismatch>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CorrectionStatus {
    Success,
    ExhaustedAttempts,
    Failed,
    Cancelled,
}

impl CorrectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CorrectionStatus::Success => "SUCCESS",
            CorrectionStatus::ExhaustedAttempts => "EXHAUSTED_ATTEMPTS",
            CorrectionStatus::Failed => "FAILED",
            CorrectionStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for CorrectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one loop invocation, including the full attempt trace.
///
/// Built only through the constructors below so `total_attempts` always
/// equals `attempts.len()` and `final_attempt` follows the status rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrectionResult {
    pub status: CorrectionStatus,
    pub final_attempt: Option<AttemptRecord>,
    pub attempts: Vec<AttemptRecord>,
    pub total_attempts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CorrectionResult {
    /// The last attempt met the threshold.
    pub(crate) fn success(attempts: Vec<AttemptRecord>) -> Self {
        let final_attempt = attempts.last().cloned();
        Self::build(CorrectionStatus::Success, final_attempt, attempts, None)
    }

    pub(crate) fn exhausted(attempts: Vec<AttemptRecord>) -> Self {
        let final_attempt = best_attempt(&attempts).cloned();
        Self::build(
            CorrectionStatus::ExhaustedAttempts,
            final_attempt,
            attempts,
            None,
        )
    }

    pub(crate) fn failed(attempts: Vec<AttemptRecord>, error: impl Into<String>) -> Self {
        Self::build(CorrectionStatus::Failed, None, attempts, Some(error.into()))
    }

    pub(crate) fn cancelled(attempts: Vec<AttemptRecord>) -> Self {
        let final_attempt = best_attempt(&attempts).cloned();
        Self::build(CorrectionStatus::Cancelled, final_attempt, attempts, None)
    }

    fn build(
        status: CorrectionStatus,
        final_attempt: Option<AttemptRecord>,
        attempts: Vec<AttemptRecord>,
        error: Option<String>,
    ) -> Self {
        Self {
            status,
            final_attempt,
            total_attempts: attempts.len() as u32,
            attempts,
            error,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == CorrectionStatus::Success
    }
}

/// Highest-scoring attempt; the earliest one wins a tie.
pub fn best_attempt(attempts: &[AttemptRecord]) -> Option<&AttemptRecord> {
    attempts.iter().fold(None, |best, candidate| match best {
        Some(current) if candidate.similarity_score <= current.similarity_score => Some(current),
        _ => Some(candidate),
    })
}
