// Correction Module - closed-loop synthesis verification
//
// Synthesize, store, transcribe back, score against the source text and
// retry until the threshold is met or the attempt budget runs out.

mod cancel;
mod request;
mod result;

pub use cancel::CancelFlag;
pub use request::{
    RequestDefaults, RequestValidationError, SynthesisRequest, SynthesisRequestPayload,
    DEFAULT_ACCURACY_THRESHOLD, DEFAULT_MAX_ATTEMPTS,
};
pub use result::{best_attempt, AttemptRecord, CorrectionResult, CorrectionStatus};

use crate::scoring::SimilarityScorer;
use crate::storage::{AudioStore, StorageError};
use crate::stt::{SpeechTranscriber, TranscriptionError};
use crate::tts::{SpeechSynthesizer, SynthesisError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// A collaborator failure that ends a loop run as `Failed`.
#[derive(Debug, Error)]
pub enum CorrectionError {
    #[error("synthesis failed: {0}")]
    Synthesis(#[from] SynthesisError),

    #[error("transcription failed: {0}")]
    Transcription(#[from] TranscriptionError),

    #[error("audio storage failed: {0}")]
    Storage(#[from] StorageError),

    #[error("scoring task failed: {0}")]
    Scoring(#[from] tokio::task::JoinError),
}

pub struct AudioCorrectionLoop {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    transcriber: Arc<dyn SpeechTranscriber>,
    store: Arc<dyn AudioStore>,
    scorer: SimilarityScorer,
}

impl AudioCorrectionLoop {
    pub fn new(
        synthesizer: Arc<dyn SpeechSynthesizer>,
        transcriber: Arc<dyn SpeechTranscriber>,
        store: Arc<dyn AudioStore>,
    ) -> Self {
        Self {
            synthesizer,
            transcriber,
            store,
            scorer: SimilarityScorer::new(),
        }
    }

    pub async fn run(&self, request: &SynthesisRequest) -> CorrectionResult {
        self.run_with_cancel(request, &CancelFlag::new()).await
    }

    /// Runs the loop, checking `cancel` before every attempt.
    ///
    /// An attempt that has already started always completes and is recorded.
    /// Collaborator errors are not retried here; transport-level retries
    /// belong to the adapters.
    pub async fn run_with_cancel(
        &self,
        request: &SynthesisRequest,
        cancel: &CancelFlag,
    ) -> CorrectionResult {
        let max_attempts = request.max_attempts();
        let mut attempts: Vec<AttemptRecord> = Vec::new();

        for attempt_number in 1..=max_attempts {
            if cancel.is_cancelled() {
                info!(
                    recorded = attempts.len(),
                    "Correction cancelled before attempt {}", attempt_number
                );
                return CorrectionResult::cancelled(attempts);
            }

            let record = match self.attempt(request, attempt_number).await {
                Ok(record) => record,
                Err(e) => {
                    warn!(attempt = attempt_number, error = %e, "Correction attempt failed");
                    return CorrectionResult::failed(attempts, e.to_string());
                }
            };

            let score = record.similarity_score;
            let accepted = score >= request.accuracy_threshold();
            attempts.push(record);

            if accepted {
                info!(
                    attempt = attempt_number,
                    score,
                    threshold = request.accuracy_threshold(),
                    "Transcription accepted"
                );
                return CorrectionResult::success(attempts);
            }

            debug!(
                attempt = attempt_number,
                score,
                threshold = request.accuracy_threshold(),
                "Score below threshold, regenerating"
            );
        }

        let result = CorrectionResult::exhausted(attempts);
        warn!(
            attempts = result.total_attempts,
            best = result.final_attempt.as_ref().map(|a| a.similarity_score),
            "Attempt budget exhausted without meeting threshold"
        );
        result
    }

    async fn attempt(
        &self,
        request: &SynthesisRequest,
        attempt_number: u32,
    ) -> Result<AttemptRecord, CorrectionError> {
        let clip = self
            .synthesizer
            .synthesize(request.source_text(), request.voice_id())
            .await?;
        debug!(
            attempt = attempt_number,
            provider = self.synthesizer.name(),
            bytes = clip.len(),
            "Audio synthesized"
        );

        let audio_reference = self.store.put(&clip).await?;

        let transcript = match self
            .transcriber
            .transcribe(&clip, request.language_hint())
            .await
        {
            Ok(transcript) => transcript,
            Err(e) => {
                // No attempt record will reference this clip.
                if let Err(delete_err) = self.store.delete(&audio_reference).await {
                    warn!(
                        reference = %audio_reference,
                        error = %delete_err,
                        "Failed to delete unreferenced audio"
                    );
                }
                return Err(e.into());
            }
        };

        // Matching is quadratic in text length; keep it off the async workers.
        let scorer = self.scorer;
        let source_text = request.source_text().to_string();
        let transcribed_text = transcript.text.clone();
        let (similarity_score, mismatched_words) = tokio::task::spawn_blocking(move || {
            let score = scorer.score(&source_text, &transcribed_text);
            let mismatches = if score < 1.0 {
                scorer.mismatched_words(&source_text, &transcribed_text)
            } else {
                Vec::new()
            };
            (score, mismatches)
        })
        .await?;

        Ok(AttemptRecord {
            attempt_number,
            transcribed_text: transcript.text,
            similarity_score,
            audio_reference,
            mismatched_words,
        })
    }
}
