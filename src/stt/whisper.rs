// Whisper.cpp Local STT Adapter

use super::{SpeechTranscriber, Transcript, TranscriptionError};
use crate::audio::AudioClip;
use async_trait::async_trait;
use regex::Regex;
use std::{
    env,
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
    sync::OnceLock,
};
use tempfile::TempDir;
use tokio::process::Command;

const AUTO_LANGUAGE: &str = "auto";

pub struct WhisperCppTranscriber {
    bin_path: PathBuf,
    model_path: PathBuf,
    scratch_root: PathBuf,
}

impl WhisperCppTranscriber {
    /// Resolve binary and model, falling back to the usual `bin/` and
    /// `models/` locations. Returns `None` when either is missing.
    pub fn discover(bin_path: Option<PathBuf>, model_path: Option<PathBuf>) -> Option<Self> {
        let bin_path = match bin_path.or_else(default_whisper_bin) {
            Some(p) if p.exists() => p,
            Some(p) => {
                tracing::warn!("Whisper bin not found at {}", p.display());
                return None;
            }
            None => {
                tracing::warn!("Whisper bin not configured. Set WHISPER_CPP_BIN.");
                return None;
            }
        };

        let model_path = match model_path.or_else(default_whisper_model) {
            Some(p) if p.exists() => p,
            Some(p) => {
                tracing::warn!("Whisper model not found at {}", p.display());
                return None;
            }
            None => {
                tracing::warn!("Whisper model not configured. Set WHISPER_MODEL.");
                return None;
            }
        };

        tracing::info!(
            "Whisper.cpp transcriber initialized: bin={}, model={}",
            bin_path.display(),
            model_path.display()
        );

        Some(Self {
            bin_path,
            model_path,
            scratch_root: env::temp_dir(),
        })
    }

    /// Parent directory for the per-call scratch directories.
    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = root.into();
        self
    }

    fn scratch_dir(&self) -> Result<TempDir, TranscriptionError> {
        tempfile::Builder::new()
            .prefix("whisper_")
            .tempdir_in(&self.scratch_root)
            .map_err(|e| TranscriptionError::ProviderError(e.to_string()))
    }

    async fn run_whisper(
        &self,
        input_path: &Path,
        out_base: &Path,
        language: &str,
    ) -> Result<String, TranscriptionError> {
        let output = Command::new(&self.bin_path)
            .arg("--model")
            .arg(&self.model_path)
            .arg("--file")
            .arg(input_path)
            .arg("--output-txt")
            .arg("--output-file")
            .arg(out_base)
            .arg("--language")
            .arg(language)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| TranscriptionError::ProviderError(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TranscriptionError::ProviderError(format!(
                "Whisper failed: {}",
                stderr.trim()
            )));
        }

        let txt_path = out_base.with_extension("txt");
        if let Ok(text) = tokio::fs::read_to_string(&txt_path).await {
            return Ok(text);
        }

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        if !stdout.trim().is_empty() {
            return Ok(stdout);
        }

        Err(TranscriptionError::ProviderError(
            "Whisper produced no output".to_string(),
        ))
    }
}

#[async_trait]
impl SpeechTranscriber for WhisperCppTranscriber {
    async fn transcribe(
        &self,
        audio: &AudioClip,
        language_hint: Option<&str>,
    ) -> Result<Transcript, TranscriptionError> {
        if audio.is_empty() {
            return Err(TranscriptionError::InvalidAudio);
        }

        // Removed on drop, including when this future is cancelled mid-run.
        let scratch = self.scratch_dir()?;
        let input_path = scratch.path().join(format!("input.{}", audio.extension()));
        let output_base = scratch.path().join("out");

        tokio::fs::write(&input_path, &audio.bytes)
            .await
            .map_err(|e| TranscriptionError::ProviderError(e.to_string()))?;

        let language = language_hint.unwrap_or(AUTO_LANGUAGE);
        let result = self.run_whisper(&input_path, &output_base, language).await;
        drop(scratch);

        let text = clean_transcript(&result?);

        Ok(Transcript {
            text,
            language: language_hint.map(str::to_string),
            provider: "Whisper.cpp".to_string(),
        })
    }

    fn name(&self) -> &str {
        "Whisper.cpp"
    }
}

/// Drop `[00:00.000 --> 00:02.000]` style markers and re-join lines.
fn clean_transcript(text: &str) -> String {
    static TS_RE: OnceLock<Regex> = OnceLock::new();
    let re = TS_RE.get_or_init(|| {
        Regex::new(r"\[\d{2}:\d{2}.*?\]|\(\d{2}:\d{2}\)").expect("valid timestamp regex")
    });
    let stripped = re.replace_all(text, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn default_whisper_bin() -> Option<PathBuf> {
    let candidates = [
        "bin/whisper-cli.exe",
        "bin/whisper-cli",
        "bin/main.exe",
        "bin/main",
    ];

    candidates
        .into_iter()
        .map(PathBuf::from)
        .find(|path| path.exists())
}

fn default_whisper_model() -> Option<PathBuf> {
    let candidates = [
        "models/ggml-large-v3.bin",
        "models/ggml-medium.bin",
        "models/ggml-small.bin",
        "models/ggml-base.bin",
    ];

    if let Some(path) = candidates.into_iter().map(PathBuf::from).find(|p| p.exists()) {
        return Some(path);
    }

    // Fallback: any ggml-*.bin in models/
    let entries = fs::read_dir("models").ok()?;
    entries.flatten().map(|entry| entry.path()).find(|path| {
        path.extension() == Some(OsStr::new("bin"))
            && path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|name| name.starts_with("ggml-"))
                .unwrap_or(false)
    })
}
